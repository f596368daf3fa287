//! Recipe generation over a `generateContent` text API.
//!
//! This module provides:
//! * [`RecipeFetcher`]: async trait implemented by fetch backends.
//! * [`GeminiClient`]: REST client for the `generateContent` endpoint.
//! * [`build_prompt`]: the fixed JSON-only recipe prompt.
//! * [`RecipeCandidate`] / [`extract_json`]: reply parsing.
//! * [`RecipeSearch`]: latest-search-wins state holder for a search screen.
//! * [`FetchError`]: error variants for fetch operations.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use cookitup::config::AppConfig;
//! use cookitup::fetch::{GeminiClient, RecipeFetcher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut config = AppConfig::default();
//!     config.fetch.api_key = Some("my-key".into());
//!
//!     let client = GeminiClient::from_config(&config.fetch);
//!     match client.fetch_recipe("banana bread").await {
//!         Ok(candidate) => println!("{:?}", candidate.recipe_name),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

pub mod client;
pub mod prompt;
pub mod response;
pub mod search;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{parse_reply, FetchError, GeminiClient, RecipeFetcher};
pub use prompt::build_prompt;
pub use response::{
    extract_json, ApiError, Candidate, Content, GenerateContentRequest, GenerateContentResponse,
    Part, RecipeCandidate, NOT_FOUND_JSON, NOT_FOUND_NAME,
};
pub use search::{RecipeSearch, SearchState};

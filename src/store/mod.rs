//! Local recipe persistence.
//!
//! # Architecture
//!
//! ```text
//! RecipeStore (trait)
//!    │
//!    └─ SqliteStore ── sqlx Pool<Sqlite> ── migrations/
//!          │
//!          ├─ watch<Vec<Recipe>>  → list_recipes()  (RecipeFeed)
//!          └─ watch<u64> revision → watch_steps(id) (StepFeed)
//! ```
//!
//! Every mutation commits, re-reads the recipe list and bumps the revision,
//! so live feeds update without any action from the caller.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use cookitup::recipe::Recipe;
//! use cookitup::store::{RecipeStore, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = SqliteStore::in_memory().await.unwrap();
//!     let id = store.insert_recipe(&Recipe::new("Tea", "water, leaves")).await.unwrap();
//!     assert!(store.get_recipe(id).await.unwrap().is_some());
//! }
//! ```

pub mod contract;
pub mod sqlite;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use contract::{RecipeFeed, RecipeStore, StepFeed, StorageError};
pub use sqlite::SqliteStore;

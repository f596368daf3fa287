//! Cooking mode: step-by-step countdowns over a recipe's steps.
//!
//! # Architecture
//!
//! ```text
//! CookingCommand (mpsc)
//!        │
//!        ▼
//! CookingRunner::run()  ← async tokio task, owns the session
//!        │
//!        ├─ command          → CookingSession::apply
//!        └─ interval tick    → CookingSession::tick   (while Running)
//!
//! watch<SessionSnapshot>  ←─── read by the terminal renderer
//! ```
//!
//! Step durations are free-form text; [`parse_duration_to_seconds`] turns
//! them into the countdown seed.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use cookitup::cooking::{CookingCommand, CookingRunner};
//! use cookitup::recipe::{RecipeId, Step};
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = CookingRunner::new(Duration::from_secs(1));
//!     let mut snapshots = runner.subscribe();
//!     let (tx, rx) = tokio::sync::mpsc::channel(8);
//!     tokio::spawn(runner.run(rx));
//!
//!     let steps = vec![Step::new(RecipeId(1), 1, "Boil water", "3 minutes")];
//!     tx.send(CookingCommand::Start(steps)).await.unwrap();
//!
//!     while snapshots.changed().await.is_ok() {
//!         let snap = snapshots.borrow().clone();
//!         println!("{} {}s", snap.state.label(), snap.remaining_secs);
//!     }
//! }
//! ```

pub mod duration;
pub mod runner;
pub mod session;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use duration::parse_duration_to_seconds;
pub use runner::{CookingCommand, CookingRunner};
pub use session::{CookingEvent, CookingSession, CookingState, SessionSnapshot};

//! Recipe data model and the save flows that feed the store.
//!
//! * [`Recipe`] / [`Step`] / [`RecipeId`]: persisted records.
//! * [`RecipeDraft`]: the manual-entry form model with contiguous step
//!   numbering.
//! * [`ValidationError`]: blank required fields, rejected before storage.
//! * [`save_draft`], [`save_candidate`], [`save_manual`]: validate then
//!   persist through any [`RecipeStore`](crate::store::RecipeStore).

pub mod draft;
pub mod model;
pub mod save;
pub mod validation;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use draft::{DraftStep, RecipeDraft};
pub use model::{Recipe, RecipeId, Step};
pub use save::{save_candidate, save_draft, save_manual, ManualRecipe, SaveError};
pub use validation::ValidationError;

//! Storage interface consumed by the save flows and the CLI.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;
use tokio_stream::wrappers::WatchStream;

use crate::recipe::{Recipe, RecipeId, Step};

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Failures of the persistence layer.  Never retried internally.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite reported an error (connection, constraint, query).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Embedded schema migrations could not be applied.
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Filesystem error while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A step set handed to `replace_steps` was not a contiguous `1..=N`
    /// sequence owned by the target recipe.
    #[error("invalid step set: {0}")]
    InvalidSteps(String),
}

// ---------------------------------------------------------------------------
// Feeds
// ---------------------------------------------------------------------------

/// Live list of every recipe, newest first.  Yields the current list on
/// first poll, then once per change.
pub type RecipeFeed = WatchStream<Vec<Recipe>>;

/// Live, position-ordered step list for one recipe.  Yields the current
/// steps on first poll, then a fresh read after every store mutation.
pub type StepFeed = BoxStream<'static, Result<Vec<Step>, StorageError>>;

// ---------------------------------------------------------------------------
// RecipeStore trait
// ---------------------------------------------------------------------------

/// Persisted collection of recipes and their ordered steps.
///
/// Implementors must be `Send + Sync` so a single store can be shared as
/// `Arc<dyn RecipeStore>` between the UI layer and background tasks.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Subscribe to the full recipe list.
    fn list_recipes(&self) -> RecipeFeed;

    /// Look up one recipe.  A missing id is `Ok(None)`, not an error.
    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>, StorageError>;

    /// Insert `recipe`, assigning an id when it has none.  When the id is
    /// already stored the row is replaced in place and its steps are kept.
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<RecipeId, StorageError>;

    /// Delete the recipe and all of its steps in one transaction.
    async fn delete_recipe(&self, id: RecipeId) -> Result<(), StorageError>;

    /// Steps of `recipe_id`, ascending by position.
    async fn list_steps(&self, recipe_id: RecipeId) -> Result<Vec<Step>, StorageError>;

    /// Subscribe to the steps of `recipe_id`.
    fn watch_steps(&self, recipe_id: RecipeId) -> StepFeed;

    /// Make the stored steps of `recipe_id` exactly `steps`.
    async fn replace_steps(&self, recipe_id: RecipeId, steps: &[Step]) -> Result<(), StorageError>;
}

// Compile-time assertion: Box<dyn RecipeStore> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn RecipeStore>) {}
};

/// Check that `steps` all belong to `recipe_id` and occupy exactly `1..=N`.
pub(crate) fn check_step_set(recipe_id: RecipeId, steps: &[Step]) -> Result<(), StorageError> {
    if let Some(stray) = steps.iter().find(|s| s.recipe_id != recipe_id) {
        return Err(StorageError::InvalidSteps(format!(
            "step {} belongs to recipe {}, not {}",
            stray.position, stray.recipe_id, recipe_id
        )));
    }

    let mut positions: Vec<u32> = steps.iter().map(|s| s.position).collect();
    positions.sort_unstable();
    let contiguous = positions
        .iter()
        .enumerate()
        .all(|(index, position)| *position == index as u32 + 1);

    if !contiguous {
        return Err(StorageError::InvalidSteps(format!(
            "positions {:?} are not exactly 1..={}",
            positions,
            steps.len()
        )));
    }
    Ok(())
}

//! Save flows: validate first, then persist.
//!
//! Nothing reaches the store when validation fails, so a rejected save never
//! leaves a partial write behind.

use thiserror::Error;

use crate::fetch::RecipeCandidate;
use crate::recipe::draft::RecipeDraft;
use crate::recipe::model::{Recipe, RecipeId};
use crate::recipe::validation::{require_name, ValidationError};
use crate::store::{RecipeStore, StorageError};

/// Why a save did not happen.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Quick-entry recipe with flattened steps text instead of structured steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualRecipe {
    pub name: String,
    pub ingredients: String,
    pub steps_text: String,
    pub preparation_time: String,
}

/// Persist a hand-entered draft and its structured steps.
///
/// Requires a non-blank name and at least one step.  Name and ingredients
/// are stored trimmed.
pub async fn save_draft(store: &dyn RecipeStore, draft: &RecipeDraft) -> Result<RecipeId, SaveError> {
    draft.validate()?;

    let recipe = Recipe::new(draft.name.trim(), draft.ingredients.trim());
    let id = store.insert_recipe(&recipe).await?;
    store.replace_steps(id, &draft.to_steps(id)).await?;

    log::info!("saved recipe {id} with {} steps", draft.steps().len());
    Ok(id)
}

/// Persist a fetched candidate.  Missing fields become empty strings.
pub async fn save_candidate(
    store: &dyn RecipeStore,
    candidate: &RecipeCandidate,
) -> Result<RecipeId, SaveError> {
    let recipe = candidate.to_recipe()?;
    let id = store.insert_recipe(&recipe).await?;

    log::info!("saved fetched recipe {id} ({:?})", recipe.name);
    Ok(id)
}

/// Persist a quick-entry recipe.  Only the name is required.
pub async fn save_manual(store: &dyn RecipeStore, manual: &ManualRecipe) -> Result<RecipeId, SaveError> {
    let name = require_name(&manual.name)?;

    let recipe = Recipe {
        id: None,
        name: name.to_string(),
        ingredients: manual.ingredients.clone(),
        steps_text: manual.steps_text.clone(),
        preparation_time: manual.preparation_time.clone(),
    };
    let id = store.insert_recipe(&recipe).await?;

    log::info!("saved manual recipe {id}");
    Ok(id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use futures::StreamExt;

    async fn store() -> SqliteStore {
        SqliteStore::in_memory().await.expect("db")
    }

    async fn recipe_count(store: &SqliteStore) -> usize {
        store.list_recipes().next().await.expect("feed").len()
    }

    #[tokio::test]
    async fn draft_is_saved_with_contiguous_steps() {
        let store = store().await;
        let mut draft = RecipeDraft::new(" Omelette ", " eggs ");
        draft.add_step("Beat eggs", "1 minute").unwrap();
        draft.add_step("Heat pan", "2 minutes").unwrap();
        draft.add_step("Cook", "3 minutes").unwrap();
        draft.remove_step(2).unwrap();

        let id = save_draft(&store, &draft).await.expect("saved");

        let recipe = store.get_recipe(id).await.unwrap().unwrap();
        assert_eq!(recipe.name, "Omelette");
        assert_eq!(recipe.ingredients, "eggs");

        let steps = store.list_steps(id).await.unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].description, "Beat eggs");
        assert_eq!(steps[1].description, "Cook");
        assert_eq!(steps[1].position, 2);
    }

    #[tokio::test]
    async fn blank_draft_name_never_reaches_storage() {
        let store = store().await;
        let mut draft = RecipeDraft::new("   ", "");
        draft.add_step("a", "1 minute").unwrap();

        let err = save_draft(&store, &draft).await.unwrap_err();
        assert!(matches!(err, SaveError::Validation(ValidationError::BlankName)));
        assert_eq!(recipe_count(&store).await, 0);
    }

    #[tokio::test]
    async fn draft_without_steps_is_rejected() {
        let store = store().await;
        let draft = RecipeDraft::new("Soup", "");
        let err = save_draft(&store, &draft).await.unwrap_err();
        assert!(matches!(err, SaveError::Validation(ValidationError::NoSteps)));
        assert_eq!(recipe_count(&store).await, 0);
    }

    #[tokio::test]
    async fn candidate_missing_fields_become_empty() {
        let store = store().await;
        let candidate = RecipeCandidate {
            recipe_name: Some("Tea".into()),
            ingredients: None,
            steps: Some("Steep".into()),
            preparation_time: None,
        };

        let id = save_candidate(&store, &candidate).await.unwrap();
        let recipe = store.get_recipe(id).await.unwrap().unwrap();
        assert_eq!(recipe.name, "Tea");
        assert_eq!(recipe.ingredients, "");
        assert_eq!(recipe.steps_text, "Steep");
        assert_eq!(recipe.preparation_time, "");
    }

    #[tokio::test]
    async fn nameless_candidate_is_rejected() {
        let store = store().await;
        let err = save_candidate(&store, &RecipeCandidate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SaveError::Validation(ValidationError::BlankName)));
    }

    #[tokio::test]
    async fn manual_recipe_keeps_flattened_fields() {
        let store = store().await;
        let manual = ManualRecipe {
            name: "Salad".into(),
            ingredients: "lettuce".into(),
            steps_text: "Chop, toss".into(),
            preparation_time: "10 minutes".into(),
        };

        let id = save_manual(&store, &manual).await.unwrap();
        let recipe = store.get_recipe(id).await.unwrap().unwrap();
        assert_eq!(recipe.steps_text, "Chop, toss");
        assert_eq!(recipe.preparation_time, "10 minutes");
        assert!(store.list_steps(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_manual_name_is_rejected() {
        let store = store().await;
        let err = save_manual(&store, &ManualRecipe::default()).await.unwrap_err();
        assert!(matches!(err, SaveError::Validation(ValidationError::BlankName)));
    }
}

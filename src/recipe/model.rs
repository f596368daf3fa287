//! Persisted recipe and step records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a stored recipe.
///
/// Assigned by the store on first insert and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecipeId(pub i64);

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named dish.
///
/// `steps_text` and `preparation_time` carry the flattened free-form variant
/// used by fetched and quick-entry recipes; structured steps live in
/// [`Step`] rows owned by the recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// `None` until the recipe has been inserted.
    pub id: Option<RecipeId>,
    pub name: String,
    pub ingredients: String,
    pub steps_text: String,
    pub preparation_time: String,
}

impl Recipe {
    /// A not-yet-persisted recipe with empty flattened fields.
    pub fn new(name: impl Into<String>, ingredients: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            ingredients: ingredients.into(),
            steps_text: String::new(),
            preparation_time: String::new(),
        }
    }
}

/// One instruction within a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub recipe_id: RecipeId,
    /// 1-based sequence position, unique within the recipe.
    pub position: u32,
    pub description: String,
    /// Free-form human duration, e.g. `"5 minutes"`.
    pub duration: String,
}

impl Step {
    pub fn new(
        recipe_id: RecipeId,
        position: u32,
        description: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            recipe_id,
            position,
            description: description.into(),
            duration: duration.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_recipe_has_no_id() {
        let recipe = Recipe::new("Tea", "water, leaves");
        assert!(recipe.id.is_none());
        assert!(recipe.steps_text.is_empty());
    }

    #[test]
    fn recipe_id_displays_inner_value() {
        assert_eq!(RecipeId(42).to_string(), "42");
    }
}

//! Manual-entry form model.
//!
//! [`RecipeDraft`] collects a name, ingredients and an ordered list of steps
//! before anything is persisted.  Step positions are kept contiguous
//! (`1..=N`) at all times: removing a step renumbers the remainder
//! immediately, preserving their relative order.

use crate::recipe::model::{RecipeId, Step};
use crate::recipe::validation::{require_name, ValidationError};

// ---------------------------------------------------------------------------
// DraftStep
// ---------------------------------------------------------------------------

/// A step that has not been attached to a stored recipe yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftStep {
    pub position: u32,
    pub description: String,
    pub duration: String,
}

// ---------------------------------------------------------------------------
// RecipeDraft
// ---------------------------------------------------------------------------

/// In-progress recipe entered by hand.
///
/// # Example
/// ```rust
/// use cookitup::recipe::RecipeDraft;
///
/// let mut draft = RecipeDraft::new("Pancakes", "flour, milk, eggs");
/// draft.add_step("Whisk batter", "2 minutes").unwrap();
/// draft.add_step("Rest", "10 minutes").unwrap();
/// draft.add_step("Fry", "90 seconds").unwrap();
///
/// draft.remove_step(2).unwrap();
/// let positions: Vec<u32> = draft.steps().iter().map(|s| s.position).collect();
/// assert_eq!(positions, vec![1, 2]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDraft {
    pub name: String,
    pub ingredients: String,
    steps: Vec<DraftStep>,
}

impl RecipeDraft {
    pub fn new(name: impl Into<String>, ingredients: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ingredients: ingredients.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step at position `N + 1` and return that position.
    ///
    /// Both fields are trimmed; blank values are rejected and the draft is
    /// left untouched.
    pub fn add_step(&mut self, description: &str, duration: &str) -> Result<u32, ValidationError> {
        let description = description.trim();
        let duration = duration.trim();

        if description.is_empty() {
            return Err(ValidationError::BlankStepDescription);
        }
        if duration.is_empty() {
            return Err(ValidationError::BlankStepDuration);
        }

        let position = self.steps.len() as u32 + 1;
        self.steps.push(DraftStep {
            position,
            description: description.to_string(),
            duration: duration.to_string(),
        });
        Ok(position)
    }

    /// Remove the step at `position` and renumber the rest to `1..=N-1`.
    pub fn remove_step(&mut self, position: u32) -> Result<(), ValidationError> {
        let before = self.steps.len();
        self.steps.retain(|s| s.position != position);
        if self.steps.len() == before {
            return Err(ValidationError::NoSuchStep(position));
        }

        for (index, step) in self.steps.iter_mut().enumerate() {
            step.position = index as u32 + 1;
        }
        Ok(())
    }

    pub fn steps(&self) -> &[DraftStep] {
        &self.steps
    }

    /// Reset every field, e.g. after a successful save.
    pub fn clear(&mut self) {
        self.name.clear();
        self.ingredients.clear();
        self.steps.clear();
    }

    /// Check the draft is savable: non-blank name and at least one step.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_name(&self.name)?;
        if self.steps.is_empty() {
            return Err(ValidationError::NoSteps);
        }
        Ok(())
    }

    /// Materialise the draft steps for the stored recipe `recipe_id`.
    pub fn to_steps(&self, recipe_id: RecipeId) -> Vec<Step> {
        self.steps
            .iter()
            .map(|s| Step::new(recipe_id, s.position, s.description.clone(), s.duration.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

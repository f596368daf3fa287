//! `generateContent` wire types and reply parsing.

use serde::{Deserialize, Serialize};

use crate::recipe::validation::require_name;
use crate::recipe::{Recipe, ValidationError};

/// Name the model returns when it has no recipe for the query.
pub const NOT_FOUND_NAME: &str = "Recipe not found";

/// Sentinel object substituted when the reply contains no JSON object.
pub const NOT_FOUND_JSON: &str =
    r#"{"recipe_name":"Recipe not found","ingredients":"","steps":"","preparation_time":""}"#;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// A single-turn request carrying `prompt` as its only text part.
    pub fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Top-level reply.  Either `candidates` or `error` is expected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

/// Error object returned by the API, either in a 2xx body or an error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiError {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub status: Option<String>,
}

impl ApiError {
    /// `"API Error {code}: {status} - {message}"`, omitting absent parts.
    pub fn describe(&self) -> String {
        let code = self.code.map(|c| format!(" {c}")).unwrap_or_default();
        let status = self.status.as_deref().unwrap_or("UNKNOWN");
        let message = self.message.as_deref().unwrap_or("Unknown error");
        format!("API Error{code}: {status} - {message}")
    }
}

// ---------------------------------------------------------------------------
// RecipeCandidate
// ---------------------------------------------------------------------------

/// Recipe as proposed by the model.  Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeCandidate {
    #[serde(default)]
    pub recipe_name: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub steps: Option<String>,
    #[serde(default)]
    pub preparation_time: Option<String>,
}

impl RecipeCandidate {
    /// Whether the model answered with the not-found sentinel.
    pub fn is_not_found(&self) -> bool {
        self.recipe_name.as_deref() == Some(NOT_FOUND_NAME)
    }

    /// Convert into an unsaved [`Recipe`]; missing fields become empty
    /// strings.  A blank or missing name is rejected.
    pub fn to_recipe(&self) -> Result<Recipe, ValidationError> {
        let name = require_name(self.recipe_name.as_deref().unwrap_or(""))?;
        Ok(Recipe {
            id: None,
            name: name.to_string(),
            ingredients: self.ingredients.clone().unwrap_or_default(),
            steps_text: self.steps.clone().unwrap_or_default(),
            preparation_time: self.preparation_time.clone().unwrap_or_default(),
        })
    }
}

/// Slice out the JSON object in `text`: from the first `{` to the last `}`.
///
/// Surrounding prose and code fences are dropped.  When no such pair exists
/// the not-found sentinel is returned instead.
///
/// ```rust
/// use cookitup::fetch::{extract_json, NOT_FOUND_JSON};
///
/// assert_eq!(extract_json("Sure! {\"a\":1} enjoy"), "{\"a\":1}");
/// assert_eq!(extract_json("no json here"), NOT_FOUND_JSON);
/// ```
pub fn extract_json(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => NOT_FOUND_JSON,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

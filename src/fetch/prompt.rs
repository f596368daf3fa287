//! Prompt template for recipe generation.
//!
//! The query is interpolated verbatim.  No escaping is performed, so a query
//! containing quotes or instructions ends up in the prompt unchanged.

/// Instructions placed before the query.
const PROMPT_HEAD: &str = "Search for a recipe for: ";

/// Reply format the model is asked to follow, including the not-found
/// sentinel.
const PROMPT_FORMAT: &str = "
Respond ONLY with a valid JSON object in this exact format (no markdown, no code blocks, no extra text):
{
    \"recipe_name\": \"Recipe Name Here\",
    \"ingredients\": \"List of ingredients here\",
    \"steps\": \"Step-by-step instructions here\",
    \"preparation_time\": \"Time in minutes or hours\"
}

If no recipe is found, respond with:
{
    \"recipe_name\": \"Recipe not found\",
    \"ingredients\": \"\",
    \"steps\": \"\",
    \"preparation_time\": \"\"
}";

/// Build the single prompt sent for `query`.
///
/// # Example
/// ```rust
/// use cookitup::fetch::build_prompt;
///
/// let prompt = build_prompt("lemon tart");
/// assert!(prompt.starts_with("Search for a recipe for: lemon tart"));
/// assert!(prompt.contains("\"preparation_time\""));
/// ```
pub fn build_prompt(query: &str) -> String {
    let mut prompt = String::with_capacity(PROMPT_HEAD.len() + query.len() + PROMPT_FORMAT.len() + 1);
    prompt.push_str(PROMPT_HEAD);
    prompt.push_str(query);
    prompt.push('\n');
    prompt.push_str(PROMPT_FORMAT);
    prompt
}

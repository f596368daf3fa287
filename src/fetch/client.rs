//! Core `RecipeFetcher` trait and `GeminiClient` implementation.
//!
//! `GeminiClient` calls `POST {base_url}/v1beta/models/{model}:generateContent`
//! with the API key as the `key` query parameter.  All connection details
//! come from [`FetchConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::FetchConfig;
use crate::fetch::prompt::build_prompt;
use crate::fetch::response::{
    extract_json, GenerateContentRequest, GenerateContentResponse, RecipeCandidate,
};

// ---------------------------------------------------------------------------
// FetchError
// ---------------------------------------------------------------------------

/// Errors that can occur while fetching a recipe.
///
/// Every variant renders a human-readable message; callers treat all of them
/// as recoverable by re-issuing the search.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No credential was supplied, so no request was sent.
    #[error("no API key configured")]
    MissingApiKey,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("recipe request timed out")]
    Timeout,

    /// The API answered with an error status or an error object.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    /// The reply could not be parsed as expected JSON.
    #[error("failed to parse recipe response: {0}")]
    Parse(String),

    /// The reply carried no candidate text.
    #[error("No response text from API. Candidates: {candidates}")]
    EmptyResponse { candidates: usize },

    /// The model answered with the not-found sentinel.
    #[error("Recipe not found")]
    NotFound,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// RecipeFetcher trait
// ---------------------------------------------------------------------------

/// Async trait for turning a free-text query into a recipe candidate.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn RecipeFetcher>`.  One call issues at most one request; there is
/// no cancellation other than dropping the future.
#[async_trait]
pub trait RecipeFetcher: Send + Sync {
    async fn fetch_recipe(&self, query: &str) -> Result<RecipeCandidate, FetchError>;
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Calls a `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    config: FetchConfig,
}

impl GeminiClient {
    /// Build a `GeminiClient` from application config.
    ///
    /// The HTTP client is pre-configured with `config.timeout_secs`.  A
    /// default client is used if the builder fails.
    pub fn from_config(config: &FetchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Same as [`from_config`](Self::from_config) with the credential
    /// replaced by `api_key`.
    pub fn with_api_key(config: &FetchConfig, api_key: impl Into<String>) -> Self {
        let mut config = config.clone();
        config.api_key = Some(api_key.into());
        Self::from_config(&config)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl RecipeFetcher for GeminiClient {
    async fn fetch_recipe(&self, query: &str) -> Result<RecipeCandidate, FetchError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(FetchError::MissingApiKey)?;

        let body = GenerateContentRequest::from_prompt(build_prompt(query));

        log::debug!("fetch: requesting recipe for {query:?} from {}", self.config.model);
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Could not read error body: {e}"));

            let message = serde_json::from_str::<GenerateContentResponse>(&error_body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.describe())
                .unwrap_or_else(|| {
                    format!(
                        "API request failed: {} - {}. Error: {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("Unknown"),
                        error_body
                    )
                });

            log::warn!("fetch: HTTP {}: {message}", status.as_u16());
            return Err(FetchError::Api {
                status: Some(status.as_u16()),
                message,
            });
        }

        let text = response.text().await?;
        let reply: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| FetchError::Parse(e.to_string()))?;

        parse_reply(&reply)
    }
}

/// Turn a successful-status reply into a candidate.
///
/// An embedded error object, a missing text part and the not-found sentinel
/// all become errors.
pub fn parse_reply(reply: &GenerateContentResponse) -> Result<RecipeCandidate, FetchError> {
    if let Some(error) = &reply.error {
        return Err(FetchError::Api {
            status: error.code.and_then(|c| u16::try_from(c).ok()),
            message: error.describe(),
        });
    }

    let text = reply.first_text().ok_or(FetchError::EmptyResponse {
        candidates: reply.candidate_count(),
    })?;

    let candidate: RecipeCandidate =
        serde_json::from_str(extract_json(text)).map_err(|e| FetchError::Parse(e.to_string()))?;

    if candidate.is_not_found() {
        log::info!("fetch: model reported no matching recipe");
        return Err(FetchError::NotFound);
    }
    Ok(candidate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

    fn make_config(base_url: &str, api_key: Option<&str>) -> FetchConfig {
        FetchConfig {
            base_url: base_url.into(),
            model: "gemini-1.5-flash".into(),
            api_key: api_key.map(|s| s.to_string()),
            timeout_secs: 5,
        }
    }

    fn reply_with_text(text: &str) -> serde_json::Value {
        json!({ "candidates": [ { "content": { "parts": [ { "text": text } ] } } ] })
    }

    async fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::from_config(&make_config(&server.uri(), Some("test-key")))
    }

    #[test]
    fn client_is_object_safe() {
        let client: Box<dyn RecipeFetcher> =
            Box::new(GeminiClient::from_config(&make_config("http://localhost", None)));
        drop(client);
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let client = GeminiClient::from_config(&make_config("https://example.test/", None));
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let client = GeminiClient::from_config(&make_config("http://127.0.0.1:9", None));
        let err = client.fetch_recipe("tea").await.unwrap_err();
        assert!(matches!(err, FetchError::MissingApiKey));

        let client = GeminiClient::from_config(&make_config("http://127.0.0.1:9", Some("")));
        assert!(matches!(
            client.fetch_recipe("tea").await.unwrap_err(),
            FetchError::MissingApiKey
        ));
    }

    #[tokio::test]
    async fn fenced_reply_yields_candidate() {
        let server = MockServer::start().await;
        let text = "Sure! ```json\n{\"recipe_name\":\"Tea\",\"ingredients\":\"water, leaves\",\"steps\":\"Steep\",\"preparation_time\":\"5 minutes\"}\n```";
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_with_text(text)))
            .expect(1)
            .mount(&server)
            .await;

        let candidate = client_for(&server).await.fetch_recipe("tea").await.unwrap();
        assert_eq!(candidate.recipe_name.as_deref(), Some("Tea"));
        assert_eq!(candidate.preparation_time.as_deref(), Some("5 minutes"));
    }

    #[tokio::test]
    async fn sentinel_reply_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply_with_text(crate::fetch::NOT_FOUND_JSON)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_recipe("xyzzy").await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound));
        assert_eq!(err.to_string(), "Recipe not found");
    }

    #[tokio::test]
    async fn prose_only_reply_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(reply_with_text("I don't know that dish.")),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_recipe("xyzzy").await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound));
    }

    #[tokio::test]
    async fn error_object_in_ok_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_recipe("tea").await.unwrap_err();
        match err {
            FetchError::Api { status, message } => {
                assert_eq!(status, Some(429));
                assert!(message.contains("RESOURCE_EXHAUSTED"));
                assert!(message.contains("Quota exceeded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_error_uses_error_object_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_recipe("tea").await.unwrap_err();
        assert!(matches!(err, FetchError::Api { status: Some(400), .. }));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn http_error_without_json_reports_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_recipe("tea").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("503"), "message: {message}");
        assert!(message.contains("upstream down"), "message: {message}");
    }

    #[tokio::test]
    async fn empty_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_recipe("tea").await.unwrap_err();
        assert!(matches!(err, FetchError::EmptyResponse { candidates: 0 }));
    }

    #[tokio::test]
    async fn non_json_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_recipe("tea").await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn malformed_embedded_json_is_parse_error() {
        let reply: GenerateContentResponse =
            serde_json::from_value(reply_with_text("{not json}")).unwrap();
        assert!(matches!(parse_reply(&reply), Err(FetchError::Parse(_))));
    }
}

use std::fmt;
use std::time::Duration;

use reqwest::{header, StatusCode};

use crate::{
    retry::{retry_with_backoff, Attempt, RetryError},
    wire::{first_candidate_text, GenerateContentRequest},
    AnalysisRequest, ClientOptions, GymSenseError, Result, StatusPolicy, TransientCallFailure,
};

/// Model used by [`GymSenseClient::new`].
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

/// Formats a model name into its `generateContent` endpoint URL.
///
/// Example: `"gemini-2.5-flash"` →
/// `"https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"`
pub fn model_endpoint_url(model: &str) -> String {
    format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
        model.trim()
    )
}

#[derive(Clone)]
/// HTTP client for the GymSense pose-analysis endpoint.
///
/// Holds no per-request state; clones share one connection pool and may run
/// requests concurrently.
pub struct GymSenseClient {
    http: reqwest::Client,
    endpoint_url: String,
    api_key: String,
    options: ClientOptions,
}

impl fmt::Debug for GymSenseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GymSenseClient")
            .field("endpoint_url", &self.endpoint_url)
            .field("api_key", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl GymSenseClient {
    /// Creates a client for [`DEFAULT_MODEL`].
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_model(DEFAULT_MODEL, api_key)
    }

    /// Creates a client for a named model on the public endpoint.
    pub fn from_model(model: impl AsRef<str>, api_key: impl Into<String>) -> Self {
        Self::with_endpoint(model_endpoint_url(model.as_ref()), api_key)
    }

    /// Creates a client for an arbitrary `generateContent`-compatible URL.
    ///
    /// The API key is appended as the `key` query parameter on every call.
    pub fn with_endpoint(endpoint_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint_url: endpoint_url.into(),
            api_key: api_key.into(),
            options: ClientOptions::default(),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `GYMSENSE_API_KEY` — API key for the endpoint (required)
    /// - `GYMSENSE_ENDPOINT` — full endpoint URL (optional, defaults to
    ///   [`DEFAULT_MODEL`] on the public endpoint)
    ///
    /// **Not available on `wasm32` targets** — pass the key to
    /// [`GymSenseClient::new`] instead.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gymsense::GymSenseClient;
    ///
    /// let client = GymSenseClient::from_env().expect("missing GYMSENSE_API_KEY");
    /// ```
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> std::result::Result<Self, String> {
        let api_key = std::env::var("GYMSENSE_API_KEY")
            .map_err(|_| "missing GYMSENSE_API_KEY environment variable".to_owned())?;
        if api_key.trim().is_empty() {
            return Err("GYMSENSE_API_KEY is set but empty".to_owned());
        }

        match std::env::var("GYMSENSE_ENDPOINT") {
            Ok(endpoint) if !endpoint.trim().is_empty() => {
                Ok(Self::with_endpoint(endpoint.trim(), api_key.trim()))
            }
            _ => Ok(Self::new(api_key.trim())),
        }
    }

    /// Applies client options such as attempt budget and backoff.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Runs the fixed pose-analysis instruction against a `data:` image URI.
    ///
    /// Resolves to the feedback text, which may be empty when the service
    /// returned no candidate.
    pub async fn run_analysis(&self, image_data_uri: &str) -> Result<String> {
        self.generate(&AnalysisRequest::pose_analysis(image_data_uri))
            .await
    }

    /// Sends one logical request, retrying failed attempts with backoff.
    ///
    /// Returns the text at `candidates[0].content.parts[0].text`, or an empty
    /// string when the response has no such field.
    pub async fn generate(&self, request: &AnalysisRequest) -> Result<String> {
        let payload = request.to_wire();
        let payload = &payload;
        let policy = self.options.retry_policy();

        retry_with_backoff(
            &policy,
            move |attempt| self.send_attempt(payload, attempt),
            |failure| self.is_retryable(failure),
        )
        .await
        .map_err(into_terminal_error)
    }

    async fn send_attempt(
        &self,
        payload: &GenerateContentRequest,
        attempt: Attempt,
    ) -> std::result::Result<String, TransientCallFailure> {
        let result = self.post_payload(payload).await;

        #[cfg(feature = "tracing")]
        if let Err(failure) = &result {
            tracing::warn!("generateContent attempt {} failed: {}", attempt.ordinal, failure);
        }
        #[cfg(not(feature = "tracing"))]
        let _ = attempt;

        result
    }

    async fn post_payload(
        &self,
        payload: &GenerateContentRequest,
    ) -> std::result::Result<String, TransientCallFailure> {
        let mut request = self
            .http
            .post(&self.endpoint_url)
            .query(&[("key", self.api_key.as_str())])
            .header(header::CONTENT_TYPE, "application/json")
            .json(payload);
        if let Some(timeout_ms) = self.options.timeout_ms {
            request = request.timeout(Duration::from_millis(timeout_ms));
        }

        let response = request
            .send()
            .await
            .map_err(TransientCallFailure::Transport)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(TransientCallFailure::Transport)?;

        if !status.is_success() {
            return Err(TransientCallFailure::Http {
                status: status.as_u16(),
                body,
            });
        }

        let decoded = serde_json::from_str::<serde_json::Value>(&body).map_err(|err| {
            TransientCallFailure::Decode(format!(
                "invalid generateContent response JSON: {err}; body: {body}"
            ))
        })?;
        Ok(first_candidate_text(&decoded)
            .map(str::to_owned)
            .unwrap_or_default())
    }

    fn is_retryable(&self, failure: &TransientCallFailure) -> bool {
        match (self.options.status_policy, failure) {
            (StatusPolicy::TransientOnly, TransientCallFailure::Http { status, .. }) => {
                StatusCode::from_u16(*status).is_ok_and(should_retry_status)
            }
            _ => true,
        }
    }
}

/// Maps the retry loop's outcome onto the crate error.
///
/// A permanently classified HTTP status becomes [`GymSenseError::Rejected`].
/// Every other failure that ended the loop is [`GymSenseError::RequestExhausted`]
/// carrying the attempts actually made.
fn into_terminal_error(err: RetryError<TransientCallFailure>) -> GymSenseError {
    match err {
        RetryError::Aborted {
            attempts,
            error: TransientCallFailure::Http { status, body },
        } => GymSenseError::Rejected {
            status,
            body,
            attempts,
        },
        RetryError::Exhausted { attempts, last }
        | RetryError::Aborted {
            attempts,
            error: last,
        } => GymSenseError::RequestExhausted { attempts, last },
    }
}

fn should_retry_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

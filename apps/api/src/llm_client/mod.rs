/// LLM Client — the single point of entry for all model calls in ResumeAI.
///
/// ARCHITECTURAL RULE: No other module may talk to the model endpoint directly.
/// All LLM interactions MUST go through a `ModelClient`.
///
/// The endpoint is a thin worker that accepts `{"prompt": "..."}` and answers with a
/// Gemini-style body. The completion is read from `candidates[0].content.parts[0].text`.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The outcome of a successful round-trip to the model.
///
/// `Missing` is the degraded case: the endpoint answered 2xx with a well-formed body that
/// carried no usable completion. It is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Text(String),
    Missing,
}

impl Completion {
    pub fn is_missing(&self) -> bool {
        matches!(self, Completion::Missing)
    }

    /// The completion text, or `""` for the degraded case.
    pub fn into_string(self) -> String {
        match self {
            Completion::Text(text) => text,
            Completion::Missing => String::new(),
        }
    }
}

/// Sends one prompt, returns one completion. No retries.
///
/// Carried in `AppState` as `Arc<dyn ModelClient>` so tests can script responses.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<Completion, LlmError>;
}

#[derive(Debug, Serialize)]
struct WorkerRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct WorkerResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Extracts the primary completion from a worker response body.
/// Any deviation from the documented path yields `Completion::Missing`.
fn completion_from_body(body: &serde_json::Value) -> Completion {
    let Ok(response) = WorkerResponse::deserialize(body) else {
        return Completion::Missing;
    };

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.is_empty())
        .map(Completion::Text)
        .unwrap_or(Completion::Missing)
}

/// HTTP client for the model worker endpoint.
#[derive(Clone)]
pub struct WorkerClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl WorkerClient {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ModelClient for WorkerClient {
    async fn invoke(&self, prompt: &str) -> Result<Completion, LlmError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&WorkerRequest { prompt });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Model endpoint returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let json: serde_json::Value = serde_json::from_str(&body)?;
        let completion = completion_from_body(&json);

        match &completion {
            Completion::Text(text) => debug!(
                "Model call succeeded: prompt_chars={}, completion_chars={}",
                prompt.len(),
                text.len()
            ),
            Completion::Missing => warn!("Model response carried no completion text"),
        }

        Ok(completion)
    }
}

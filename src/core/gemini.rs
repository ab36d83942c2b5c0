// gemini integration - sends the transcript, gets one completion back

use crate::core::config::{Credential, ModelConfig};
use crate::core::session::{Role, Turn};
use crate::Error;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct Gemini {
    client: reqwest::Client,
    config: ModelConfig,
    credential: Credential,
    // when the previous call went out, for spacing calls
    last_call: Mutex<Option<Instant>>,
}

// what we send to gemini
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Request<'a> {
    system_instruction: Instruction<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Instruction<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

// what gemini sends back
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

impl Gemini {
    /// Fails fast on a bad config; never touches the network.
    pub fn new(config: ModelConfig, credential: Credential) -> Result<Self, Error> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| Error::Configuration(format!("http client: {e}")))?;

        Ok(Self {
            client,
            config,
            credential,
            last_call: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Sends `history` (everything before the new prompt) plus `prompt` and
    /// returns the best completion as plain text.
    pub async fn respond(&self, history: &[Turn], prompt: &str) -> Result<String, Error> {
        self.throttle().await;

        let timeout = self.config.timeout;
        match tokio::time::timeout(timeout, self.send(history, prompt)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(?timeout, "gemini call timed out");
                Err(Error::Timeout(timeout))
            }
        }
    }

    async fn throttle(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(prev) = *last_call {
            let wait = self.config.min_interval.saturating_sub(prev.elapsed());
            if !wait.is_zero() {
                debug!(?wait, "spacing out model calls");
                tokio::time::sleep(wait).await;
            }
        }
        *last_call = Some(Instant::now());
    }

    async fn send(&self, history: &[Turn], prompt: &str) -> Result<String, Error> {
        let mut contents: Vec<Content> = history.iter().map(Content::from_turn).collect();
        contents.push(Content {
            role: "user",
            parts: [Part { text: prompt }],
        });

        let request = Request {
            system_instruction: Instruction {
                parts: [Part {
                    text: &self.config.system_instruction,
                }],
            },
            contents,
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        debug!(%url, turns = history.len() + 1, "sending request to gemini");

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "gemini request failed");
                Error::ServiceUnavailable(format!("request failed: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::ServiceUnavailable(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            warn!(%status, "gemini returned an error");
            return Err(map_http_error(status, &body));
        }

        let parsed: Response = serde_json::from_str(&body)
            .map_err(|e| Error::ServiceUnavailable(format!("malformed response: {e}")))?;
        let text = extract_text(parsed)?;

        info!(
            latency_ms = started.elapsed().as_millis() as u64,
            chars = text.len(),
            "gemini responded"
        );
        Ok(text)
    }
}

impl<'a> Content<'a> {
    fn from_turn(turn: &'a Turn) -> Self {
        let role = match turn.role() {
            Role::User => "user",
            Role::Assistant => "model",
        };
        Self {
            role,
            parts: [Part { text: turn.text() }],
        }
    }
}

fn extract_text(response: Response) -> Result<String, Error> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if !text.trim().is_empty() {
        return Ok(text);
    }

    match response.prompt_feedback.and_then(|f| f.block_reason) {
        Some(reason) => Err(Error::ServiceUnavailable(format!(
            "prompt blocked by the model service ({reason})"
        ))),
        None => Err(Error::ServiceUnavailable(
            "model returned no text".to_string(),
        )),
    }
}

fn map_http_error(status: StatusCode, body: &str) -> Error {
    let (status_text, message) = serde_json::from_str::<ErrorWrapper>(body)
        .map(|w| {
            (
                w.error.status.unwrap_or_default(),
                w.error.message.unwrap_or_else(|| body.to_string()),
            )
        })
        .unwrap_or_else(|_| (String::new(), body.to_string()));

    let detail = if status_text.is_empty() {
        format!("{status}: {message}")
    } else {
        format!("{status} {status_text}: {message}")
    };

    // gemini answers a bad key with 400 INVALID_ARGUMENT
    let bad_key = status == StatusCode::BAD_REQUEST
        && (body.contains("API_KEY_INVALID") || message.to_lowercase().contains("api key"));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(detail),
        _ if bad_key => Error::Authentication(detail),
        StatusCode::TOO_MANY_REQUESTS => Error::ServiceUnavailable(format!("quota exceeded: {detail}")),
        _ => Error::ServiceUnavailable(detail),
    }
}

// model configuration and credential handling

use crate::Error;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-001";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TOP_P: f32 = 0.8;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1000);

// env vars checked for the api key, in order
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

pub const SYSTEM_INSTRUCTION: &str = r#"You are a Manufacturing Plant SOP & Safety Explainer Bot. Your role is to EXPLAIN safety procedures and SOPs in simple, clear language.

IMPORTANT SAFETY RESTRICTIONS:
1. ONLY EXPLAIN procedures - NEVER approve actions
2. NEVER make operational decisions or compliance judgments
3. NEVER replace human supervisor authority
4. Always say "Consult your supervisor for approval" when actions are mentioned
5. Use simple language suitable for new employees/interns
6. Reference standard manufacturing safety practices

Sample topics you can explain:
- Lockout-Tagout (LOTO) procedures
- Safety gear requirements
- Emergency shutdown steps
- Machine operation SOPs
- PPE usage guidelines

ALWAYS end with: "For specific approvals, consult your supervisor."

Respond in short, clear paragraphs with bullet points when helpful."#;

/// Everything sent alongside each request. Built once, never changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub model: String,
    pub system_instruction: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
    /// Minimum spacing between two calls from the same client.
    pub min_interval: Duration,
    pub base_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout: DEFAULT_TIMEOUT,
            min_interval: DEFAULT_MIN_INTERVAL,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.model.trim().is_empty() {
            return Err(Error::Configuration("model name is empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(Error::Configuration(format!(
                "temperature must be within 0..=1, got {}",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(Error::Configuration(format!(
                "top_p must be within 0..=1, got {}",
                self.top_p
            )));
        }
        if self.max_output_tokens == 0 {
            return Err(Error::Configuration(
                "max output tokens must be positive".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::Configuration("timeout must be positive".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Configuration(format!(
                "base url must be http(s), got {}",
                self.base_url
            )));
        }
        Ok(())
    }
}

/// The api key. Never printed.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        let key = key.trim();
        if key.is_empty() {
            return Err(missing_key());
        }
        Ok(Self(key.to_string()))
    }

    /// Explicit key first, then the environment.
    pub fn resolve(explicit: Option<String>) -> Result<Self, Error> {
        if let Some(key) = explicit {
            return Self::new(key);
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, Error> {
        API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.trim().is_empty())
            .map(Self::new)
            .unwrap_or_else(|| Err(missing_key()))
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

fn missing_key() -> Error {
    Error::Configuration(format!("missing api key. set one of: {}", API_KEY_VARS.join(", ")))
}

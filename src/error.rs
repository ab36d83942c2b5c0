use miette::Diagnostic;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(sopbot::config),
        help("set GEMINI_API_KEY (or GOOGLE_API_KEY), or pass --api-key")
    )]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    #[diagnostic(
        code(sopbot::auth),
        help("please check your api key and try again")
    )]
    Authentication(String),

    #[error("Model service unavailable: {0}")]
    #[diagnostic(code(sopbot::service))]
    ServiceUnavailable(String),

    #[error("Model call timed out after {}s", .0.as_secs_f32())]
    #[diagnostic(code(sopbot::timeout), help("retry, or raise --timeout"))]
    Timeout(Duration),

    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors that end a single turn but leave the session usable.
    pub fn is_turn_failure(&self) -> bool {
        matches!(
            self,
            Error::Authentication(_) | Error::ServiceUnavailable(_) | Error::Timeout(_)
        )
    }
}

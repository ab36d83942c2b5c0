// core logic - session, model client, and the safety post-filter

mod chat;
mod config;
mod gemini;
mod safety;
mod session;

pub use chat::{Chat, Reply};
pub use config::{
    API_KEY_VARS, Credential, DEFAULT_BASE_URL, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MIN_INTERVAL,
    DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT, DEFAULT_TOP_P, ModelConfig,
    SYSTEM_INSTRUCTION,
};
pub use gemini::Gemini;
pub use safety::{DISCLAIMER, Safety, TRIGGERS};
pub use session::{Role, Session, Turn};

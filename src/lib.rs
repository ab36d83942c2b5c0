// sopbot library - manufacturing sop & safety explainer chat

pub mod cli;
pub mod core;
mod error;
mod output;
pub mod tui;

pub use crate::core::{Chat, Credential, Gemini, ModelConfig, Reply, Role, Safety, Session, Turn};
pub use error::Error;

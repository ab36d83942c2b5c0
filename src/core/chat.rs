// one chat turn: record prompt, ask the model, filter, record reply

use crate::core::gemini::Gemini;
use crate::core::safety::Safety;
use crate::core::session::{Session, Turn};
use crate::Error;
use std::time::{Duration, Instant};
use tracing::info;

pub struct Chat {
    model: Gemini,
}

/// A successful turn.
#[derive(Debug, Clone)]
pub struct Reply {
    /// What was stored in the session, disclaimer included.
    pub text: String,
    /// Trigger phrase that caused the disclaimer, if any.
    pub trigger: Option<&'static str>,
    pub latency: Duration,
}

impl Chat {
    pub fn new(model: Gemini) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Gemini {
        &self.model
    }

    /// Runs a full turn. On failure the user turn stays in the session and no
    /// assistant turn is added, so the user can simply resubmit.
    pub async fn send(&self, session: &mut Session, prompt: &str) -> Result<Reply, Error> {
        if prompt.trim().is_empty() {
            return Err(Error::EmptyPrompt);
        }

        session.append(Turn::user(prompt));

        let started = Instant::now();
        let raw = self.complete(session).await?;
        Ok(self.record(session, raw, started.elapsed()))
    }

    /// Asks the model about the newest turn, using everything before it as
    /// history. The session must end with the user's prompt.
    pub async fn complete(&self, session: &Session) -> Result<String, Error> {
        let (prompt, history) = session
            .all()
            .split_last()
            .ok_or(Error::EmptyPrompt)?;

        self.model.respond(history, prompt.text()).await
    }

    /// Filters a raw completion and appends it as the assistant turn.
    pub fn record(&self, session: &mut Session, raw: String, latency: Duration) -> Reply {
        let safety = Safety::check(&raw);
        if let Some(trigger) = safety.trigger {
            info!(trigger, "reply matched a trigger phrase, disclaimer appended");
        }

        let text = Safety::filter(&raw);
        session.append(Turn::assistant(text.clone()));

        Reply {
            text,
            trigger: safety.trigger,
            latency,
        }
    }
}

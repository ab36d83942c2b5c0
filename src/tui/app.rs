// app state for the tui

use crate::core::ModelConfig;
use crate::tui::theme::{Theme, ThemeKind, detect_theme};
use crate::{Error, Reply};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Transcript,
    Prompt,
    Logs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Themes,
    Samples,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Ok,
    Info,
    Warn,
    Error,
}

/// Preset questions: (button label, prompt text).
pub const SAMPLE_QUERIES: [(&str, &str); 3] = [
    ("Explain Lockout-Tagout", "Explain lockout-tagout in simple terms"),
    (
        "Safety gear for heavy machines",
        "What safety gear is used near heavy machines?",
    ),
    ("Emergency shutdown", "Summarize emergency shutdown procedure"),
];

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl ModelInfo {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            name: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_output_tokens,
            timeout_secs: config.timeout.as_secs(),
        }
    }
}

pub struct App {
    pub running: bool,
    pub mode: Mode,
    pub panel: Panel,
    pub popup: Popup,
    pub fullscreen: bool,
    pub theme_kind: ThemeKind,
    pub theme: Theme,

    pub model_info: ModelInfo,

    // prompt input (multi-line), cursor counts chars not bytes
    pub prompt: String,
    pub prompt_cursor: usize,

    // request state
    pub loading: bool,
    pub pending_since: Option<Instant>,
    pub spinner: usize,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
    pub flagged_replies: usize,

    // logs
    pub logs: Vec<LogEntry>,

    // scroll
    pub transcript_scroll: usize,
    pub transcript_max_scroll: usize,
    pub follow_transcript: bool,
    pub log_scroll: usize,
    pub theme_scroll: usize,
    pub sample_index: usize,

    // history
    pub history: Vec<String>,
    pub history_index: Option<usize>,
}

impl App {
    pub fn new(model_info: ModelInfo) -> Self {
        Self::with_theme(model_info, detect_theme())
    }

    pub fn with_theme(model_info: ModelInfo, theme_kind: ThemeKind) -> Self {
        let mut app = Self {
            running: true,
            mode: Mode::Normal,
            panel: Panel::Prompt,
            popup: Popup::None,
            fullscreen: false,
            theme_kind,
            theme: Theme::from_kind(theme_kind),
            model_info,
            prompt: String::new(),
            prompt_cursor: 0,
            loading: false,
            pending_since: None,
            spinner: 0,
            latency_ms: None,
            error: None,
            flagged_replies: 0,
            logs: Vec::new(),
            transcript_scroll: 0,
            transcript_max_scroll: 0,
            follow_transcript: true,
            log_scroll: 0,
            theme_scroll: theme_kind.index(),
            sample_index: 0,
            history: Vec::new(),
            history_index: None,
        };

        app.log(
            LogLevel::Ok,
            format!("model ready: {}", app.model_info.name),
        );
        app.log(LogLevel::Info, "explanation-only instruction loaded".to_string());
        app.log(LogLevel::Info, "press 1-3 or s for sample questions".to_string());

        app
    }

    pub fn log(&mut self, level: LogLevel, message: String) {
        self.logs.push(LogEntry { level, message });
        // auto-scroll to bottom
        if self.logs.len() > 1 {
            self.log_scroll = self.logs.len().saturating_sub(10);
        }
    }

    pub fn set_theme(&mut self, kind: ThemeKind) {
        self.theme_kind = kind;
        self.theme = Theme::from_kind(kind);
        self.theme_scroll = kind.index();
    }

    pub fn open_theme_popup(&mut self) {
        self.popup = Popup::Themes;
        self.theme_scroll = self.theme_kind.index();
    }

    pub fn open_samples_popup(&mut self) {
        self.popup = Popup::Samples;
    }

    pub fn close_popup(&mut self) {
        self.popup = Popup::None;
    }

    pub fn theme_scroll_up(&mut self) {
        if self.theme_scroll > 0 {
            self.theme_scroll -= 1;
            self.set_theme(ThemeKind::ALL[self.theme_scroll]);
        }
    }

    pub fn theme_scroll_down(&mut self) {
        if self.theme_scroll < ThemeKind::ALL.len() - 1 {
            self.theme_scroll += 1;
            self.set_theme(ThemeKind::ALL[self.theme_scroll]);
        }
    }

    pub fn select_theme(&mut self) {
        self.set_theme(ThemeKind::ALL[self.theme_scroll]);
        self.close_popup();
    }

    pub fn sample_up(&mut self) {
        self.sample_index = self.sample_index.saturating_sub(1);
    }

    pub fn sample_down(&mut self) {
        if self.sample_index < SAMPLE_QUERIES.len() - 1 {
            self.sample_index += 1;
        }
    }

    pub fn select_sample(&mut self) {
        self.use_sample(self.sample_index);
        self.close_popup();
    }

    /// Pre-fills the prompt with a preset question; the user still submits it.
    pub fn use_sample(&mut self, index: usize) {
        let Some((label, text)) = SAMPLE_QUERIES.get(index) else {
            return;
        };
        self.prompt = text.to_string();
        self.prompt_cursor = self.prompt_len();
        self.history_index = None;
        self.panel = Panel::Prompt;
        self.log(LogLevel::Info, format!("sample loaded: {label}"));
    }

    pub fn cycle_panel(&mut self) {
        self.panel = match self.panel {
            Panel::Prompt => Panel::Transcript,
            Panel::Transcript => Panel::Logs,
            Panel::Logs => Panel::Prompt,
        };
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }

    pub fn enter_insert(&mut self) {
        self.mode = Mode::Insert;
        self.panel = Panel::Prompt;
    }

    pub fn exit_insert(&mut self) {
        self.mode = Mode::Normal;
    }

    // prompt editing
    fn prompt_len(&self) -> usize {
        self.prompt.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.prompt
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.prompt.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.prompt_cursor);
        self.prompt.insert(at, c);
        self.prompt_cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn delete_char(&mut self) {
        if self.prompt_cursor > 0 {
            self.prompt_cursor -= 1;
            let at = self.byte_index(self.prompt_cursor);
            self.prompt.remove(at);
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.prompt_cursor < self.prompt_len() {
            let at = self.byte_index(self.prompt_cursor);
            self.prompt.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.prompt_cursor = self.prompt_cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.prompt_cursor < self.prompt_len() {
            self.prompt_cursor += 1;
        }
    }

    pub fn move_cursor_start(&mut self) {
        self.prompt_cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.prompt_cursor = self.prompt_len();
    }

    pub fn clear_prompt(&mut self) {
        self.prompt.clear();
        self.prompt_cursor = 0;
    }

    // history navigation
    pub fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        match self.history_index {
            None => {
                self.history_index = Some(self.history.len() - 1);
            }
            Some(i) if i > 0 => {
                self.history_index = Some(i - 1);
            }
            _ => {}
        }
        if let Some(i) = self.history_index {
            self.prompt = self.history[i].clone();
            self.prompt_cursor = self.prompt_len();
        }
    }

    pub fn history_down(&mut self) {
        match self.history_index {
            Some(i) if i < self.history.len() - 1 => {
                self.history_index = Some(i + 1);
                self.prompt = self.history[i + 1].clone();
                self.prompt_cursor = self.prompt_len();
            }
            Some(_) => {
                self.history_index = None;
                self.clear_prompt();
            }
            None => {}
        }
    }

    /// Takes the prompt for sending. Blank input and submits while a call is
    /// still pending are ignored.
    pub fn submit(&mut self) -> Option<String> {
        if self.loading || self.prompt.trim().is_empty() {
            return None;
        }
        let query = self.prompt.clone();
        self.history.push(query.clone());
        self.history_index = None;
        self.clear_prompt();
        self.error = None;
        Some(query)
    }

    pub fn begin_request(&mut self, prompt: &str) {
        self.loading = true;
        self.pending_since = Some(Instant::now());
        self.spinner = 0;
        self.follow_transcript = true;
        self.log(
            LogLevel::Info,
            format!("asking: {}", prompt.lines().next().unwrap_or(prompt)),
        );
    }

    pub fn tick(&mut self) {
        self.spinner = (self.spinner + 1) % SPINNER.len();
    }

    /// Spinner text shown while a call is outstanding.
    pub fn pending_label(&self) -> String {
        let waited = self
            .pending_since
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0);
        format!(
            "{} thinking about safety... {waited}s (esc to cancel)",
            SPINNER[self.spinner]
        )
    }

    fn finish_request(&mut self) {
        if let Some(start) = self.pending_since.take() {
            self.latency_ms = Some(start.elapsed().as_millis() as u64);
        }
        self.loading = false;
        self.follow_transcript = true;
    }

    pub fn set_reply(&mut self, reply: &Reply) {
        self.finish_request();
        self.latency_ms = Some(reply.latency.as_millis() as u64);
        self.error = None;
        match reply.trigger {
            Some(trigger) => {
                self.flagged_replies += 1;
                self.log(
                    LogLevel::Warn,
                    format!("reply mentioned \"{trigger}\", reminder appended"),
                );
            }
            None => self.log(LogLevel::Ok, "answer received".to_string()),
        }
    }

    pub fn set_error(&mut self, err: String) {
        self.finish_request();
        self.error = Some(err.clone());
        self.log(LogLevel::Error, err);
    }

    // a failed model call; the question stays in the transcript
    pub fn fail_request(&mut self, err: &Error) {
        self.set_error(err.to_string());
        match err {
            Error::Authentication(_) => self.log(
                LogLevel::Warn,
                "check your api key, resubmitting will fail the same way".to_string(),
            ),
            _ if err.is_turn_failure() => {
                self.log(LogLevel::Info, "resubmit to try again".to_string())
            }
            _ => {}
        }
    }

    pub fn cancel_request(&mut self) {
        self.finish_request();
        self.error = Some("request cancelled".to_string());
        self.log(LogLevel::Warn, "request cancelled".to_string());
    }

    pub fn scroll_up(&mut self) {
        match self.panel {
            Panel::Transcript => {
                self.follow_transcript = false;
                self.transcript_scroll = self.transcript_scroll.saturating_sub(1);
            }
            Panel::Logs => self.log_scroll = self.log_scroll.saturating_sub(1),
            Panel::Prompt => {}
        }
    }

    pub fn scroll_down(&mut self) {
        match self.panel {
            Panel::Transcript => {
                if self.transcript_scroll < self.transcript_max_scroll {
                    self.transcript_scroll += 1;
                }
                self.follow_transcript = self.transcript_scroll >= self.transcript_max_scroll;
            }
            Panel::Logs => {
                if self.log_scroll + 1 < self.logs.len() {
                    self.log_scroll += 1;
                }
            }
            Panel::Prompt => {}
        }
    }
}

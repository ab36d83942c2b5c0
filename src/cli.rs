// command line interface

use crate::core::{
    DEFAULT_BASE_URL, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MIN_INTERVAL, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT, DEFAULT_TOP_P, SYSTEM_INSTRUCTION,
};
use crate::output::Output;
use crate::{Chat, Credential, Error, Gemini, ModelConfig, Session};
use clap::{Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sopbot",
    about = "Manufacturing SOP & safety explainer. Explains procedures, never approves them"
)]
struct Cli {
    /// api key for the gemini api
    #[arg(long, short = 'k', env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// model identifier
    #[arg(long, short, default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// sampling temperature (0..=1)
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE, global = true)]
    temperature: f32,

    /// nucleus sampling threshold (0..=1)
    #[arg(long, default_value_t = DEFAULT_TOP_P, global = true)]
    top_p: f32,

    /// cap on tokens per answer
    #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT_TOKENS, global = true)]
    max_tokens: u32,

    /// seconds to wait for the model before giving up
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs(), global = true)]
    timeout: u64,

    /// minimum milliseconds between two model calls
    #[arg(long, default_value_t = DEFAULT_MIN_INTERVAL.as_millis() as u64, global = true)]
    min_interval: u64,

    /// api base url
    #[arg(long, env = "SOPBOT_BASE_URL", default_value = DEFAULT_BASE_URL, hide = true, global = true)]
    base_url: String,

    /// write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// ask a single question and print the answer
    Ask {
        /// the question
        #[arg(required = true)]
        prompt: Vec<String>,

        /// print json instead of text
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn model_config(&self) -> ModelConfig {
        ModelConfig {
            model: self.model.clone(),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            temperature: self.temperature,
            top_p: self.top_p,
            max_output_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout),
            min_interval: Duration::from_millis(self.min_interval),
            base_url: self.base_url.clone(),
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let interactive = cli.command.is_none();
    init_logging(cli.log_file.as_ref(), interactive)?;

    // resolve the key and build the client before anything else runs
    // a blank GEMINI_API_KEY falls through to GOOGLE_API_KEY
    let api_key = cli.api_key.clone().filter(|key| !key.trim().is_empty());
    let credential = Credential::resolve(api_key)?;
    let model = Gemini::new(cli.model_config(), credential)?;
    let chat = Chat::new(model);

    match cli.command {
        Some(Commands::Ask { prompt, json }) => {
            let prompt = prompt.join(" ");
            let mut session = Session::new();
            let reply = chat.send(&mut session, &prompt).await?;
            if json {
                Output::raw(&prompt, &reply);
            } else {
                Output::pretty(&prompt, &reply);
            }
            Ok(())
        }

        None => Ok(crate::tui::run(chat).await?),
    }
}

// the tui owns the terminal, so logs only go somewhere when a file is given
fn init_logging(log_file: Option<&PathBuf>, interactive: bool) -> Result<(), Error> {
    let default_level = if interactive { "sopbot=info" } else { "sopbot=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None if !interactive => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        None => {}
    }

    Ok(())
}

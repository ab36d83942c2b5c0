// terminal ui

mod app;
mod ascii;
mod event;
mod theme;
mod ui;

pub use app::{App, LogLevel, Mode, ModelInfo, Panel, Popup, SAMPLE_QUERIES};
pub use event::{Action, handle_key};
pub use theme::ThemeKind;
pub use ui::render;

use crossterm::{
    cursor::SetCursorStyle,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, stdout};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::core::{Session, Turn};
use crate::{Chat, Error};
use event::{handle_event, poll_cancel, poll_event};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

fn copy_to_clipboard(text: &str) -> bool {
    use std::io::Write;
    use std::process::{Command, Stdio};

    // pbcopy (macOS), then xclip and xsel (Linux)
    let candidates: [(&str, &[&str]); 3] = [
        ("pbcopy", &[]),
        ("xclip", &["-selection", "clipboard"]),
        ("xsel", &["--clipboard", "--input"]),
    ];

    for (program, args) in candidates {
        if let Ok(mut child) = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .spawn()
            && let Some(stdin) = child.stdin.as_mut()
            && stdin.write_all(text.as_bytes()).is_ok()
        {
            drop(child.stdin.take());
            return child.wait().map(|s| s.success()).unwrap_or(false);
        }
    }

    false
}

pub async fn run(chat: Chat) -> Result<(), Error> {
    // setup terminal
    enable_raw_mode().map_err(|e| Error::Terminal(format!("raw mode: {e}")))?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| Error::Terminal(format!("alternate screen: {e}")))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| Error::Terminal(e.to_string()))?;

    info!(model = %chat.model().config().model, "interactive session started");

    // run app
    let result = run_app(&mut terminal, &chat).await;

    // restore terminal
    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        SetCursorStyle::DefaultUserShape,
        LeaveAlternateScreen
    )
    .ok();
    terminal.show_cursor().ok();

    result
}

async fn run_app(terminal: &mut Term, chat: &Chat) -> Result<(), Error> {
    let mut app = App::new(ModelInfo::from_config(chat.model().config()));
    // the one conversation this process holds; dropped on exit
    let mut session = Session::new();

    let mut last_mode = app.mode;

    loop {
        // update cursor style before render
        if app.mode != last_mode {
            let cursor_style = match app.mode {
                Mode::Insert => SetCursorStyle::BlinkingBar,
                Mode::Normal => SetCursorStyle::BlinkingBlock,
            };
            execute!(terminal.backend_mut(), cursor_style).ok();
            last_mode = app.mode;
        }

        terminal.draw(|frame| ui::render(frame, &mut app, &session))?;

        if let Some(event) = poll_event(Duration::from_millis(100))? {
            match handle_event(&mut app, event) {
                Action::Quit => break,
                Action::Submit(prompt) => {
                    ask(terminal, &mut app, &mut session, chat, prompt).await?;
                }
                Action::CopyReply => match session.last_reply() {
                    Some(turn) if copy_to_clipboard(turn.text()) => {
                        app.log(LogLevel::Ok, "answer copied to clipboard".to_string());
                    }
                    Some(_) => app.log(LogLevel::Warn, "clipboard not available".to_string()),
                    None => app.log(LogLevel::Warn, "no answer to copy".to_string()),
                },
                Action::ExportTranscript => {
                    if session.is_empty() {
                        app.log(LogLevel::Warn, "nothing to export yet".to_string());
                    } else {
                        let filename = format!(
                            "sopbot_transcript_{}.md",
                            chrono::Local::now().format("%Y%m%d_%H%M%S")
                        );
                        match std::fs::write(&filename, session.to_markdown()) {
                            Ok(_) => app.log(LogLevel::Ok, format!("exported to {filename}")),
                            Err(e) => app.log(LogLevel::Error, format!("export failed: {e}")),
                        }
                    }
                }
                Action::None => {}
            }
        }

        if !app.running {
            break;
        }
    }

    info!(turns = session.len(), "interactive session ended");
    Ok(())
}

// one turn, with the ui still drawing and listening for cancel while the
// model call is outstanding
async fn ask(
    terminal: &mut Term,
    app: &mut App,
    session: &mut Session,
    chat: &Chat,
    prompt: String,
) -> Result<(), Error> {
    session.append(Turn::user(prompt.as_str()));
    app.begin_request(&prompt);
    let started = Instant::now();

    let outcome = {
        let transcript: &Session = session;
        let call = chat.complete(transcript);
        tokio::pin!(call);

        loop {
            terminal.draw(|frame| ui::render(frame, &mut *app, transcript))?;

            tokio::select! {
                result = &mut call => break Some(result),
                _ = tokio::time::sleep(Duration::from_millis(100)) => {
                    app.tick();
                    if poll_cancel()? {
                        break None;
                    }
                }
            }
        }
    };

    match outcome {
        Some(Ok(raw)) => {
            let reply = chat.record(session, raw, started.elapsed());
            app.set_reply(&reply);
        }
        Some(Err(e)) if e.is_turn_failure() => {
            warn!(error = %e, "turn failed");
            app.fail_request(&e);
        }
        Some(Err(e)) => return Err(e),
        None => {
            warn!("turn cancelled by user");
            app.cancel_request();
        }
    }

    Ok(())
}

// event handling

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::tui::app::{App, Mode, Popup};

pub enum Action {
    None,
    Quit,
    Submit(String),
    CopyReply,
    ExportTranscript,
}

pub fn poll_event(timeout: Duration) -> std::io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Drains pending input while a model call is outstanding. Returns true when
/// the user asked to cancel (esc or ctrl+c); other keys are dropped.
pub fn poll_cancel() -> std::io::Result<bool> {
    while let Some(event) = poll_event(Duration::ZERO)? {
        if let Event::Key(key) = event {
            let ctrl_c =
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if key.kind == KeyEventKind::Press && (key.code == KeyCode::Esc || ctrl_c) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

pub fn handle_event(app: &mut App, event: Event) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        _ => Action::None,
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> Action {
    // global keys (work in any mode)
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Action::Quit;
        }
        _ => {}
    }

    // handle popups first
    match app.popup {
        Popup::Themes => return handle_theme_popup(app, key),
        Popup::Samples => return handle_samples_popup(app, key),
        Popup::None => {}
    }

    match app.mode {
        Mode::Normal => handle_normal_key(app, key),
        Mode::Insert => handle_insert_key(app, key),
    }
}

fn handle_theme_popup(app: &mut App, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_popup(),
        KeyCode::Char('j') | KeyCode::Down => app.theme_scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.theme_scroll_up(),
        KeyCode::Enter => app.select_theme(),
        _ => {}
    }
    Action::None
}

fn handle_samples_popup(app: &mut App, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_popup(),
        KeyCode::Char('j') | KeyCode::Down => app.sample_down(),
        KeyCode::Char('k') | KeyCode::Up => app.sample_up(),
        KeyCode::Char(c @ '1'..='3') => {
            app.use_sample(c as usize - '1' as usize);
            app.close_popup();
        }
        KeyCode::Enter => app.select_sample(),
        _ => {}
    }
    Action::None
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> Action {
    match key.code {
        // quit
        KeyCode::Char('q') => Action::Quit,

        // enter insert mode
        KeyCode::Char('i') => {
            app.enter_insert();
            Action::None
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            app.move_cursor_end();
            app.enter_insert();
            Action::None
        }
        KeyCode::Char('I') => {
            app.move_cursor_start();
            app.enter_insert();
            Action::None
        }

        // sample questions
        KeyCode::Char(c @ '1'..='3') => {
            app.use_sample(c as usize - '1' as usize);
            Action::None
        }
        KeyCode::Char('s') => {
            app.open_samples_popup();
            Action::None
        }

        // panels
        KeyCode::Tab => {
            app.cycle_panel();
            Action::None
        }
        KeyCode::Char('f') => {
            app.toggle_fullscreen();
            Action::None
        }

        // theme popup
        KeyCode::Char('t') => {
            app.open_theme_popup();
            Action::None
        }

        // copy last answer
        KeyCode::Char('y') => Action::CopyReply,

        // export transcript
        KeyCode::Char('x') => Action::ExportTranscript,

        // scrolling
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_down();
            Action::None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_up();
            Action::None
        }

        // history
        KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.history_up();
            Action::None
        }
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.history_down();
            Action::None
        }

        // submit
        KeyCode::Enter => match app.submit() {
            Some(query) => Action::Submit(query),
            None => Action::None,
        },

        _ => Action::None,
    }
}

fn handle_insert_key(app: &mut App, key: KeyEvent) -> Action {
    // check control keys first
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('a') => app.move_cursor_start(),
            KeyCode::Char('e') => app.move_cursor_end(),
            KeyCode::Char('u') => app.clear_prompt(),
            KeyCode::Char('p') => app.history_up(),
            KeyCode::Char('n') => app.history_down(),
            // ctrl+enter for newline
            KeyCode::Enter => app.insert_newline(),
            _ => {}
        }
        return Action::None;
    }

    // shift+enter for newline
    if key.modifiers.contains(KeyModifiers::SHIFT) && key.code == KeyCode::Enter {
        app.insert_newline();
        return Action::None;
    }

    match key.code {
        KeyCode::Esc => app.exit_insert(),

        KeyCode::Enter => {
            app.exit_insert();
            if let Some(query) = app.submit() {
                return Action::Submit(query);
            }
        }

        // editing
        KeyCode::Char(c) => app.insert_char(c),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Delete => app.delete_char_forward(),

        // cursor movement
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.move_cursor_start(),
        KeyCode::End => app.move_cursor_end(),

        // history
        KeyCode::Up => app.history_up(),
        KeyCode::Down => app.history_down(),

        _ => {}
    }
    Action::None
}

// ui rendering

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::core::{Role, Session};
use crate::tui::app::{App, LogLevel, Mode, Panel, Popup, SAMPLE_QUERIES};
use crate::tui::ascii::{BANNER, LOGO};
use crate::tui::theme::{Theme, ThemeKind};

pub fn render(frame: &mut Frame, app: &mut App, session: &Session) {
    let theme = &app.theme;

    // clear with bg color
    frame.render_widget(Clear, frame.area());
    frame.render_widget(Block::default().style(theme.base()), frame.area());

    // main layout: header + content + footer
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // header with logo
            Constraint::Min(10),   // content
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, session, main[0]);
    render_content(frame, app, session, main[1]);
    render_footer(frame, app, main[2]);

    // render popups on top
    match app.popup {
        Popup::Themes => render_theme_popup(frame, app),
        Popup::Samples => render_samples_popup(frame, app),
        Popup::None => {}
    }
}

fn render_header(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border())
        .style(theme.base());

    frame.render_widget(block, area);

    // logo on the left, info on the right
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(18), Constraint::Min(20)])
        .margin(1)
        .split(area);

    let logo_lines: Vec<Line> = LOGO
        .iter()
        .map(|&line| Line::styled(line, theme.accent()))
        .collect();
    frame.render_widget(Paragraph::new(logo_lines).style(theme.base()), inner[0]);

    let latency = app
        .latency_ms
        .map(|ms| format!("{ms}ms"))
        .unwrap_or_else(|| "-".to_string());

    let mode_str = match app.mode {
        Mode::Normal => "normal",
        Mode::Insert => "insert",
    };

    let info = &app.model_info;
    let info_lines = vec![
        Line::from(vec![
            Span::styled("| ", theme.muted()),
            Span::styled("Manufacturing SOP & Safety Explainer", theme.title()),
        ]),
        Line::from(vec![
            Span::styled("| Model: ", theme.muted()),
            Span::styled(&info.name, theme.base()),
            Span::styled(
                format!(
                    " (temp {:.1}, top-p {:.1}, max {} tok, timeout {}s)",
                    info.temperature, info.top_p, info.max_tokens, info.timeout_secs
                ),
                theme.muted(),
            ),
        ]),
        Line::from(vec![
            Span::styled("| Turns: ", theme.muted()),
            Span::styled(session.len().to_string(), theme.base()),
            Span::styled("  | Reminders: ", theme.muted()),
            Span::styled(app.flagged_replies.to_string(), theme.warning()),
            Span::styled("  | Last: ", theme.muted()),
            Span::styled(latency, theme.accent()),
            Span::styled("  | Mode: ", theme.muted()),
            Span::styled(mode_str, theme.accent()),
        ]),
        Line::from(vec![
            Span::styled("| ", theme.muted()),
            Span::styled("[1-3]", theme.accent()),
            Span::styled(" Samples  ", theme.muted()),
            Span::styled("[Tab]", theme.accent()),
            Span::styled(" Panels  ", theme.muted()),
            Span::styled("[t]", theme.accent()),
            Span::styled(" Themes  ", theme.muted()),
            Span::styled("[q]", theme.accent()),
            Span::styled(" Quit", theme.muted()),
        ]),
    ];

    frame.render_widget(Paragraph::new(info_lines).style(theme.base()), inner[1]);
}

fn render_content(frame: &mut Frame, app: &mut App, session: &Session, area: Rect) {
    if app.fullscreen {
        // render only the active panel in fullscreen
        match app.panel {
            Panel::Transcript => render_transcript(frame, app, session, area),
            Panel::Prompt => render_prompt(frame, app, area),
            Panel::Logs => render_logs(frame, app, area),
        }
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(6)])
        .split(area);

    let top_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(rows[0]);

    render_transcript(frame, app, session, top_cols[0]);
    render_logs(frame, app, top_cols[1]);
    render_prompt(frame, app, rows[1]);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let mut parts = vec![
        Span::styled(" Enter ", theme.base().bg(theme.accent).fg(theme.bg)),
        Span::styled(" Ask ", theme.muted()),
        Span::styled("| ", theme.border()),
        Span::styled("i ", theme.accent()),
        Span::styled("Type ", theme.muted()),
        Span::styled("s ", theme.accent()),
        Span::styled("Samples ", theme.muted()),
        Span::styled("| ", theme.border()),
        Span::styled("y ", theme.accent()),
        Span::styled("Copy ", theme.muted()),
        Span::styled("x ", theme.accent()),
        Span::styled("Export ", theme.muted()),
        Span::styled("| ", theme.border()),
        Span::styled("f ", theme.accent()),
    ];

    if app.fullscreen {
        parts.push(Span::styled("Exit Full ", theme.warning()));
    } else {
        parts.push(Span::styled("Full ", theme.muted()));
    }

    parts.extend([
        Span::styled("| ", theme.border()),
        Span::styled("t ", theme.accent()),
        Span::styled("Theme ", theme.muted()),
        Span::styled("| ", theme.border()),
        Span::styled("q ", theme.accent()),
        Span::styled("Quit ", theme.muted()),
    ]);

    let paragraph = Paragraph::new(Line::from(parts))
        .style(theme.base())
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn panel_block<'a>(theme: &Theme, title: String, active: bool) -> Block<'a> {
    let border_style = if active {
        theme.accent()
    } else {
        theme.border()
    };

    Block::default()
        .title(Span::styled(title, theme.title()))
        .borders(Borders::ALL)
        .border_style(border_style)
        .style(theme.base())
}

fn transcript_lines<'a>(app: &'a App, session: &'a Session) -> Vec<Line<'a>> {
    let theme = &app.theme;
    let mut lines: Vec<Line> = BANNER
        .iter()
        .map(|&l| Line::styled(l, theme.warning()))
        .collect();
    lines.push(Line::styled(
        "-----------------------------------------------",
        theme.border(),
    ));

    if session.is_empty() && !app.loading {
        lines.push(Line::styled(
            "ask about SOPs, safety procedures, or manufacturing processes...",
            theme.muted(),
        ));
    }

    for turn in session.all() {
        lines.push(Line::from(""));
        let header_style = match turn.role() {
            Role::User => theme.accent(),
            Role::Assistant => theme.success(),
        };
        lines.push(Line::styled(format!("> {}", turn.role().label()), header_style));

        for text_line in turn.text().lines() {
            let style = if text_line.starts_with("⚠️") {
                theme.warning()
            } else {
                theme.base()
            };
            lines.push(Line::styled(text_line, style));
        }
    }

    if app.loading {
        lines.push(Line::from(""));
        lines.push(Line::styled(app.pending_label(), theme.muted()));
    } else if let Some(err) = &app.error {
        lines.push(Line::from(""));
        lines.push(Line::styled(format!("error: {err}"), theme.error()));
        lines.push(Line::styled(
            "resubmit to try again (up recalls your last question)",
            theme.muted(),
        ));
    }

    lines
}

fn render_transcript(frame: &mut Frame, app: &mut App, session: &Session, area: Rect) {
    let inner = area.inner(Margin {
        horizontal: 1,
        vertical: 1,
    });

    // rows counted with the same word wrapping the paragraph renders with
    let height = Paragraph::new(transcript_lines(app, session))
        .wrap(Wrap { trim: false })
        .line_count(inner.width);

    app.transcript_max_scroll = height.saturating_sub(inner.height as usize);
    if app.follow_transcript || app.transcript_scroll > app.transcript_max_scroll {
        app.transcript_scroll = app.transcript_max_scroll;
    }

    let title = format!(" Transcript ({} turns) ", session.len());
    let block = panel_block(&app.theme, title, app.panel == Panel::Transcript);
    let paragraph = Paragraph::new(transcript_lines(app, session))
        .block(block)
        .style(app.theme.base())
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset(app.transcript_scroll), 0));

    frame.render_widget(paragraph, area);
}

// paragraph scroll is u16; clamp instead of wrapping
fn scroll_offset(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn render_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let active = app.panel == Panel::Prompt;

    let title = if app.loading {
        " Question (waiting for answer) ".to_string()
    } else {
        " Question ".to_string()
    };
    let block = panel_block(theme, title, active);

    // no visual cursor, the real terminal cursor is used
    let content = if app.prompt.is_empty() && app.mode != Mode::Insert {
        vec![Line::styled(
            "press 'i' to type a question, or 1-3 for a sample...",
            theme.muted(),
        )]
    } else {
        app.prompt
            .lines()
            .map(|l| Line::styled(l.to_string(), theme.base()))
            .collect()
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .style(theme.base())
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);

    if app.mode == Mode::Insert && active {
        let inner = area.inner(Margin {
            horizontal: 1,
            vertical: 1,
        });

        let (cursor_line, cursor_col) = {
            let mut line = 0usize;
            let mut col = 0usize;
            for ch in app.prompt.chars().take(app.prompt_cursor) {
                if ch == '\n' {
                    line += 1;
                    col = 0;
                } else {
                    col += 1;
                }
            }
            (line, col)
        };

        let cursor_x = inner.x + cursor_col as u16;
        let cursor_y = inner.y + cursor_line as u16;

        // only set cursor if within bounds
        if cursor_x < inner.right() && cursor_y < inner.bottom() {
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }
}

fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = panel_block(theme, " Logs ".to_string(), app.panel == Panel::Logs);

    let lines: Vec<Line> = app
        .logs
        .iter()
        .map(|entry| {
            let (prefix, style) = match entry.level {
                LogLevel::Ok => ("[OK]", theme.success()),
                LogLevel::Info => ("[--]", theme.muted()),
                LogLevel::Warn => ("[!!]", theme.warning()),
                LogLevel::Error => ("[ERR]", theme.error()),
            };
            Line::from(vec![
                Span::styled(format!("{prefix} "), style),
                Span::styled(entry.message.as_str(), theme.base()),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(theme.base())
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset(app.log_scroll), 0));

    frame.render_widget(paragraph, area);
}

fn popup_help(theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(" j/k ", theme.accent()),
        Span::styled("navigate  ", theme.muted()),
        Span::styled("enter ", theme.accent()),
        Span::styled("select  ", theme.muted()),
        Span::styled("esc ", theme.accent()),
        Span::styled("close", theme.muted()),
    ])
}

fn menu_line<'a>(theme: &Theme, label: String, selected: bool) -> Line<'a> {
    if selected {
        Line::from(vec![
            Span::styled(" > ", theme.accent()),
            Span::styled(label, theme.selected().fg(theme.accent)),
        ])
    } else {
        Line::from(vec![Span::styled(format!("   {label}"), theme.base())])
    }
}

fn render_theme_popup(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = centered_rect(40, 50, frame.area());

    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(Span::styled(" select theme ", theme.title()))
        .borders(Borders::ALL)
        .border_style(theme.accent())
        .style(theme.base());

    let mut lines: Vec<Line> = ThemeKind::ALL
        .iter()
        .enumerate()
        .map(|(i, &kind)| menu_line(theme, kind.name().to_string(), i == app.theme_scroll))
        .collect();

    lines.push(Line::from(""));
    lines.push(popup_help(theme));

    frame.render_widget(Paragraph::new(lines).block(block).style(theme.base()), area);
}

fn render_samples_popup(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = centered_rect(60, 40, frame.area());

    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(Span::styled(" try these sample queries ", theme.title()))
        .borders(Borders::ALL)
        .border_style(theme.accent())
        .style(theme.base());

    let mut lines = Vec::new();
    for (i, (label, text)) in SAMPLE_QUERIES.iter().enumerate() {
        lines.push(menu_line(
            theme,
            format!("{}. {label}", i + 1),
            i == app.sample_index,
        ));
        lines.push(Line::styled(format!("      \"{text}\""), theme.muted()));
    }

    lines.push(Line::from(""));
    lines.push(popup_help(theme));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .style(theme.base())
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

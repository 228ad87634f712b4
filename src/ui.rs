use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use codedrill::certificate::COMPLETION_THRESHOLD;
use codedrill::session::Status;

use crate::{App, View};

const HORIZONTAL_MARGIN: u16 = 4;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.view {
            View::Drill => render_drill(self, area, buf),
            View::Certificate => render_certificate(self, area, buf),
        }
    }
}

fn render_drill(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints(
            [
                Constraint::Length(2), // header
                Constraint::Min(1),    // target text
                Constraint::Length(2), // status / results
                Constraint::Length(1), // notice
                Constraint::Length(1), // key hints
            ]
            .as_ref(),
        )
        .split(area);

    header(app).render(chunks[0], buf);

    Paragraph::new(target_lines(app))
        .wrap(Wrap { trim: false })
        .render(chunks[1], buf);

    status_line(app).render(chunks[2], buf);

    if let Some(notice) = &app.notice {
        Paragraph::new(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Yellow),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }

    hints(app).render(chunks[4], buf);
}

fn header(app: &App) -> Paragraph<'_> {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let clock = match app.session.remaining() {
        Some(secs) => format!("{secs}s left"),
        None => format!("{} budget", app.session.limit()),
    };

    let line = Line::from(vec![
        Span::styled(app.session.user_name.clone(), bold),
        Span::styled(
            format!(
                "  |  {} {}  |  {}",
                app.difficulty,
                app.snippet().language,
                clock
            ),
            dim,
        ),
    ]);

    Paragraph::new(line).alignment(Alignment::Center)
}

/// Per-character colouring of the target snippet against what has been
/// typed so far: correct green, incorrect red (showing what was typed),
/// the next expected character underlined, the untyped tail dim.
fn target_lines(app: &App) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let green = Style::default().patch(bold).fg(Color::Green);
    let red = Style::default().patch(bold).fg(Color::Red);
    let dim = Style::default().patch(bold).add_modifier(Modifier::DIM);
    let cursor = Style::default()
        .patch(dim)
        .add_modifier(Modifier::UNDERLINED);

    let typed: Vec<char> = app.session.typed_text().chars().collect();
    let mut lines = Vec::new();
    let mut current: Vec<Span> = Vec::new();

    for (idx, target_char) in app.session.target_text().chars().enumerate() {
        let (glyph, style) = if idx < typed.len() {
            if typed[idx] == target_char {
                (printable(target_char), green)
            } else {
                (printable(typed[idx]), red)
            }
        } else if idx == typed.len() {
            (printable(target_char), cursor)
        } else {
            (printable(target_char), dim)
        };

        current.push(Span::styled(glyph, style));
        if target_char == '\n' {
            lines.push(Line::from(std::mem::take(&mut current)));
        }
    }
    lines.push(Line::from(current));
    lines
}

fn printable(c: char) -> String {
    match c {
        ' ' => "·".to_string(),
        '\n' => "⏎".to_string(),
        '\t' => "→".to_string(),
        c => c.to_string(),
    }
}

fn status_line(app: &App) -> Paragraph<'_> {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let line = match app.session.status() {
        Status::Idle => Line::from(Span::styled(
            "press enter to start",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        )),
        Status::Active => Line::from(Span::styled(
            "typing...",
            Style::default().add_modifier(Modifier::DIM),
        )),
        Status::Flagged => Line::from(Span::styled(
            "paste detected - session flagged, no score recorded",
            Style::default().patch(bold).fg(Color::Red),
        )),
        Status::Completed => {
            let summary = app
                .session
                .summary()
                .expect("completed sessions always carry a summary");
            let mut spans = vec![
                Span::styled(format!("{} wpm", summary.wpm), bold.fg(Color::Green)),
                Span::raw("  "),
                Span::styled(format!("{}% acc", summary.accuracy), bold.fg(Color::Cyan)),
                Span::raw("  "),
                Span::styled(summary.level.to_string(), bold.fg(Color::Yellow)),
            ];
            if summary.accuracy < COMPLETION_THRESHOLD {
                spans.push(Span::styled(
                    format!("  (certificate needs {COMPLETION_THRESHOLD}% accuracy)"),
                    Style::default().fg(Color::Yellow),
                ));
            } else {
                spans.push(Span::styled(
                    "  (c: view certificate)",
                    Style::default().add_modifier(Modifier::DIM),
                ));
            }
            Line::from(spans)
        }
    };

    Paragraph::new(line).alignment(Alignment::Center)
}

fn hints(app: &App) -> Paragraph<'_> {
    let hint = match app.session.status() {
        Status::Active => "esc: quit",
        Status::Idle => "enter: start   n: next snippet   esc: quit",
        Status::Completed | Status::Flagged => {
            "enter: retry   r: reset   n: next snippet   esc: quit"
        }
    };

    Paragraph::new(Span::styled(
        hint,
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    ))
    .alignment(Alignment::Center)
}

fn render_certificate(app: &App, area: Rect, buf: &mut Buffer) {
    let text = app
        .certificate_text
        .as_deref()
        .unwrap_or("no certificate to show");

    let width = text
        .lines()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0) as u16;
    let height = text.lines().count() as u16 + 2;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    // the artifact pads its own lines, so center the block, not the text
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(area.width.saturating_sub(width) / 2),
            Constraint::Length(width.min(area.width)),
            Constraint::Min(0),
        ])
        .split(rows[1]);

    Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .render(columns[1], buf);

    Paragraph::new(Span::styled(
        "s: save to file   b: back   esc: quit",
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(rows[2], buf);
}

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::app::{App, AppMode};
use crate::core::DataUrl;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Title/input
            Constraint::Min(10),    // Image panes
            Constraint::Length(3),  // Controls
            Constraint::Length(3),  // Status bar
            Constraint::Length(2),  // Help line
        ])
        .split(frame.area());

    if app.mode == AppMode::Input {
        draw_input(frame, app, chunks[0]);
    } else {
        draw_title(frame, chunks[0]);
    }

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    draw_original(frame, app, panes[0]);
    draw_edited(frame, app, panes[1]);

    draw_controls(frame, app, chunks[2]);
    draw_status(frame, app, chunks[3]);
    draw_help(frame, app, chunks[4]);
}

fn draw_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "Vintage Vibes",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" - Record album color grading with Gemini", Style::default().fg(Color::Gray)),
    ])])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(title, area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title("Photo path (Enter to open, Esc to cancel)"),
        );
    frame.render_widget(input, area);

    // Show cursor
    frame.set_cursor_position((
        area.x + app.cursor_pos as u16 + 1,
        area.y + 1,
    ));
}

fn pane(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
}

fn draw_original(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.session.original_image() {
        Some(image) => image_lines(image, app.session.file_name().unwrap_or("(unnamed)").to_string()),
        None => placeholder("Upload a photo to begin"),
    };

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(pane("Original"));
    frame.render_widget(widget, area);
}

fn draw_edited(frame: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;

    let lines = if session.is_busy() {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "AI is working its magic...",
                Style::default().fg(Color::Yellow),
            )),
        ]
    } else if let Some(error) = session.error() {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Oh no, something went wrong!",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(error, Style::default().fg(Color::Red))),
        ]
    } else if let Some(image) = session.edited_image() {
        let mut lines = image_lines(image, session.download_name());
        if let Some(text) = session.text_response() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            )));
        }
        if let Some(path) = &app.saved_path {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Saved to {}", path.display()),
                Style::default().fg(Color::Green),
            )));
        }
        lines
    } else {
        placeholder("Your edited image will appear here")
    };

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(pane("Vintage Edit"));
    frame.render_widget(widget, area);
}

fn image_lines(image: &DataUrl, name: String) -> Vec<Line<'static>> {
    let decoded = image.decode();
    let size_kb = decoded.byte_len() as f64 / 1024.0;
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White);

    vec![
        Line::from(""),
        Line::from(Span::styled(
            name,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Type: ", label),
            Span::styled(decoded.mime_type, value),
        ]),
        Line::from(vec![
            Span::styled("Size: ", label),
            Span::styled(format!("{:.1} KB", size_kb), value),
        ]),
    ]
}

fn placeholder(text: &str) -> Vec<Line<'_>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(text, Style::default().fg(Color::DarkGray))),
    ]
}

fn draw_controls(frame: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;
    let enabled = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let disabled = Style::default().fg(Color::DarkGray);

    let upload_style = if session.is_busy() { disabled } else { enabled };
    let edit_style = if session.is_busy() || session.original_image().is_none() {
        disabled
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };
    let edit_label = if session.is_busy() {
        "Applying Filter..."
    } else {
        "Create Vintage Look"
    };

    let mut spans = vec![
        Span::styled("[o] Upload Photo", upload_style),
        Span::raw("   "),
        Span::styled(format!("[e] {}", edit_label), edit_style),
    ];
    if session.edited_image().is_some() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            "[s] Download",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }

    let controls = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(controls, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let (message, style) = if let Some(status) = &app.status_message {
        (status.as_str(), Style::default().fg(Color::Green))
    } else if let Some(err) = app.session.error() {
        (err, Style::default().fg(Color::Red))
    } else if app.session.is_busy() {
        ("Working...", Style::default().fg(Color::Yellow))
    } else {
        ("Ready", Style::default().fg(Color::Gray))
    };

    let status = Paragraph::new(message)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, area);
}

fn draw_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.mode {
        AppMode::Input => "Enter: Open | Esc: Cancel",
        AppMode::Main => "o: Open photo | e/Enter: Vintage look | s: Save | q: Quit",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

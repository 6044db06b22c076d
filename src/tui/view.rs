//! Rendering of the four screens.

use super::controller::{Session, State};
use crate::executor::Action;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use tui_input::Input;

const TITLE: &str = "ClippyCLI - AI Command Generator";
const MAX_WIDTH: u16 = 80;
const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Styles used by the UI, built once at startup.
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub heading: Style,
    pub prompt_echo: Style,
    pub command: Style,
    pub command_border: Style,
    pub input: Style,
    pub input_border: Style,
    pub placeholder: Style,
    pub help: Style,
    pub error: Style,
    pub spinner: Style,
    pub detail: Style,
}

impl Default for Theme {
    fn default() -> Self {
        let accent = Color::Rgb(0x7C, 0x3A, 0xED);
        let muted = Color::Rgb(0x6B, 0x72, 0x80);
        Self {
            title: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            heading: Style::default()
                .fg(Color::Rgb(0x05, 0x96, 0x69))
                .add_modifier(Modifier::BOLD),
            prompt_echo: Style::default().fg(muted).add_modifier(Modifier::ITALIC),
            command: Style::default()
                .fg(Color::Rgb(0xF9, 0xFA, 0xFB))
                .bg(Color::Rgb(0x1F, 0x29, 0x37)),
            command_border: Style::default().fg(muted),
            input: Style::default().fg(Color::White),
            input_border: Style::default().fg(Color::DarkGray),
            placeholder: Style::default().fg(Color::DarkGray),
            help: Style::default().fg(muted),
            error: Style::default()
                .fg(Color::Rgb(0xDC, 0x26, 0x26))
                .add_modifier(Modifier::BOLD),
            spinner: Style::default().fg(accent),
            detail: Style::default().fg(Color::Gray),
        }
    }
}

/// Draw the current screen.
pub fn draw(frame: &mut Frame, session: &Session, theme: &Theme) {
    let area = content_area(frame.area());
    let [title_area, body_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);

    frame.render_widget(Paragraph::new(Span::styled(TITLE, theme.title)), title_area);

    match session.state {
        State::Input | State::Edit => draw_input(frame, body_area, session, theme),
        State::Loading => draw_loading(frame, body_area, session, theme),
        State::Result => draw_result(frame, body_area, session, theme),
    }
}

/// Left-aligned column, at most [`MAX_WIDTH`] wide, with a one-cell margin.
fn content_area(area: Rect) -> Rect {
    let inner = Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    Rect {
        width: inner.width.min(MAX_WIDTH),
        ..inner
    }
}

fn heading_for_input(session: &Session) -> &'static str {
    match session.state {
        State::Edit => "Edit your prompt:",
        _ if !session.input.value().trim().is_empty() => "Review your prompt:",
        _ => "What would you like to do?",
    }
}

fn draw_input(frame: &mut Frame, area: Rect, session: &Session, theme: &Theme) {
    let [heading_area, input_area, help_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(Span::styled(heading_for_input(session), theme.heading)),
        heading_area,
    );
    draw_input_box(frame, input_area, &session.input, theme);

    let help = match session.state {
        State::Edit => "Press Enter to regenerate • Ctrl+C/Esc to quit",
        _ => "Press Enter to generate command • Ctrl+C/Esc to quit",
    };
    frame.render_widget(Paragraph::new(Span::styled(help, theme.help)), help_area);
}

fn draw_input_box(frame: &mut Frame, area: Rect, input: &Input, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if input.value().is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("Describe what you want to do...", theme.placeholder)),
            inner,
        );
        frame.set_cursor_position((inner.x, inner.y));
        return;
    }

    // Scroll by display columns, leaving one cell for the cursor.
    let width = inner.width.saturating_sub(1).max(1) as usize;
    let scroll = input.visual_scroll(width);
    let cursor = input.visual_cursor();

    frame.render_widget(
        Paragraph::new(Span::styled(input.value(), theme.input)).scroll((0, scroll as u16)),
        inner,
    );
    frame.set_cursor_position((inner.x + (cursor - scroll) as u16, inner.y));
}

fn draw_loading(frame: &mut Frame, area: Rect, session: &Session, theme: &Theme) {
    let spinner = SPINNER_FRAMES[session.spinner_frame % SPINNER_FRAMES.len()];
    let lines = vec![
        Line::from(Span::styled("Generating command for:", theme.heading)),
        Line::default(),
        Line::from(Span::styled(format!("\"{}\"", session.prompt), theme.prompt_echo)),
        Line::default(),
        Line::from(vec![
            Span::styled(spinner, theme.spinner),
            Span::raw(" Thinking..."),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_result(frame: &mut Frame, area: Rect, session: &Session, theme: &Theme) {
    let (top, help) = match (&session.generated_command, &session.last_error) {
        (_, Some(error)) => {
            let [error_area, rest] =
                Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);
            frame.render_widget(
                Paragraph::new(Span::styled(format!("Error: {}", error), theme.error))
                    .wrap(Wrap { trim: false }),
                error_area,
            );
            (rest, "Press any key to quit".to_string())
        }
        (Some(command), None) => {
            let [heading_area, command_area, rest] = Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(command_height(command, area.width)),
                Constraint::Min(0),
            ])
            .areas(area);
            frame.render_widget(
                Paragraph::new(Span::styled("Generated command:", theme.heading)),
                heading_area,
            );
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(theme.command_border);
            frame.render_widget(
                Paragraph::new(command.as_str())
                    .style(theme.command)
                    .wrap(Wrap { trim: false })
                    .block(block),
                command_area,
            );
            (rest, result_help(session.confirm_action))
        }
        (None, None) => (area, "Press any key to quit".to_string()),
    };

    let [detail_area, help_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(top);
    frame.render_widget(Paragraph::new(Span::styled(help, theme.help)), help_area);

    if session.verbose {
        if let Some(full_prompt) = &session.full_prompt {
            let mut lines = vec![Line::from(Span::styled("Sent to model:", theme.heading))];
            lines.extend(
                full_prompt
                    .lines()
                    .map(|line| Line::from(Span::styled(line.to_string(), theme.detail))),
            );
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), detail_area);
        }
    }
}

fn result_help(action: Action) -> String {
    let enter = match action {
        Action::Execute => "execute",
        Action::Copy => "copy",
    };
    format!(
        "Press Enter to {} • C to copy • E to edit prompt • Any other key to cancel",
        enter
    )
}

/// Rows needed for the bordered command box.
fn command_height(command: &str, width: u16) -> u16 {
    let inner = width.saturating_sub(2).max(1) as usize;
    let rows: usize = command
        .lines()
        .map(|line| line.chars().count().max(1).div_ceil(inner))
        .sum();
    rows.max(1) as u16 + 2
}

pub mod date_input;
pub mod grid;

use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}

/// One line under a grid: red for errors, gray for hints.
pub fn render_status<B: Backend>(frame: &mut Frame<B>, area: Rect, error: Option<&str>, hint: &str) {
    let paragraph = match error {
        Some(error) => Paragraph::new(format!("Error: {}", error)).style(Style::default().fg(Color::Red)),
        None => Paragraph::new(hint).style(Style::default().fg(Color::White)),
    };
    frame.render_widget(
        paragraph
            .block(Block::default().borders(Borders::TOP))
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// Message box drawn inside a form; yellow for warnings, red otherwise.
pub fn render_message<B: Backend>(frame: &mut Frame<B>, area: Rect, message: &str, warning: bool) {
    let (title, color) = if warning {
        ("Warning", Color::Yellow)
    } else {
        ("Error", Color::Red)
    };
    let popup = Paragraph::new(vec![Spans::from(message)])
        .block(Block::default().title(title).borders(Borders::ALL))
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true });
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

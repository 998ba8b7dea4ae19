use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::snapshot::DashboardSnapshot;

pub fn render(frame: &mut Frame, snapshot: &DashboardSnapshot, area: Rect) {
    let running = snapshot.running_count();
    let enabled = snapshot.enabled_count();
    let running_color = if running == 0 {
        Color::Red
    } else if running < enabled {
        Color::Yellow
    } else {
        Color::Green
    };

    let status_line = Line::from(vec![
        Span::styled(
            env!("CARGO_PKG_NAME"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            concat!("v", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled("  |  ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}", snapshot.taken_at.format("%H:%M:%S")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled("  |  ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("Services: {}/{} running", running, enabled),
            Style::default().fg(running_color),
        ),
    ]);

    let status_bar = Paragraph::new(status_line).block(
        Block::default()
            .title(" Overview ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(status_bar, area);
}

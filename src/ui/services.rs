use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};

use crate::snapshot::{DashboardSnapshot, ServiceView};
use crate::status::Status;
use crate::ui::logs::colorize_line;

pub fn render(frame: &mut Frame, snapshot: &DashboardSnapshot, area: Rect, panels: &[Rect]) {
    let outer = Block::default()
        .title(" 🚀 Development servers ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    frame.render_widget(outer, area);

    for (service, panel) in snapshot.services.iter().zip(panels) {
        render_service(frame, service, *panel);
    }
}

fn render_service(frame: &mut Frame, service: &ServiceView, area: Rect) {
    let border = if service.is_running() {
        Color::Green
    } else {
        Color::Red
    };
    let block = Block::default()
        .title(format!(" {} ", service.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let content = service_text(service);
    let visible = area.height.saturating_sub(2);
    let scroll = (content.lines.len() as u16).saturating_sub(visible);

    let widget = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::Gray))
        .scroll((scroll, 0));

    frame.render_widget(widget, area);
}

fn service_text(service: &ServiceView) -> Text<'static> {
    let (status_text, status_color) = if service.enabled {
        (service.status.to_string(), status_color(&service.status))
    } else {
        ("Disabled".to_string(), Color::DarkGray)
    };

    let mut lines = vec![
        field("Command", service.command.clone(), Color::White),
        field(
            "Directory",
            service.directory.display().to_string(),
            Color::White,
        ),
        field("Status", status_text, status_color),
        Line::from(""),
        Line::from(Span::styled(
            "Logs:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    if !service.enabled {
        lines.push(placeholder("(disabled)"));
    } else if service.logs.is_empty() {
        lines.push(placeholder("(waiting for output)"));
    } else {
        lines.extend(service.logs.iter().map(|line| colorize_line(line)));
    }

    Text::from(lines)
}

fn field(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}: ", label),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn placeholder(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}

fn status_color(status: &Status) -> Color {
    match status {
        Status::Running => Color::Green,
        Status::Exited(0) => Color::Gray,
        Status::Exited(_) => Color::Red,
        Status::NotStarted => Color::Yellow,
    }
}

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render(frame: &mut Frame, quit_key: char, area: Rect) {
    let controls_widget = Paragraph::new(controls_line(quit_key))
        .block(
            Block::default()
                .title(" Controls ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::Gray));

    frame.render_widget(controls_widget, area);
}

fn controls_line(quit_key: char) -> Line<'static> {
    let mut spans = Vec::new();
    push_key(&mut spans, "Stop all and quit", quit_key.to_string(), Color::Red);
    spans.push(sep());
    push_key(&mut spans, "Interrupt", "Ctrl+C".to_string(), Color::Red);
    Line::from(spans)
}

fn push_key(spans: &mut Vec<Span<'static>>, label: &str, value: String, color: Color) {
    spans.push(Span::styled(format!("{} ", label), Style::default().fg(color)));
    spans.push(Span::styled("[", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
        value,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("]", Style::default().fg(Color::DarkGray)));
}

fn sep() -> Span<'static> {
    Span::styled(" · ", Style::default().fg(Color::DarkGray))
}

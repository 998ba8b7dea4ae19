use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

pub fn colorize_line(line: &str) -> Line<'static> {
    if line.trim().is_empty() {
        return Line::from("");
    }
    Line::from(Span::styled(
        line.to_string(),
        Style::default().fg(classify_log_body_color(line)),
    ))
}

fn classify_log_body_color(body: &str) -> Color {
    let lower = body.to_ascii_lowercase();

    if lower.contains(" panic")
        || lower.contains("panicked")
        || lower.contains("fatal")
        || lower.contains("error")
        || lower.contains("exception")
        || lower.contains("failed")
    {
        return Color::Red;
    }

    if lower.contains("warn") || lower.contains("deprecated") {
        return Color::Yellow;
    }

    if lower.contains("debug") || lower.contains("trace") {
        return Color::LightBlue;
    }

    if lower.contains("ready")
        || lower.contains("listening")
        || lower.contains("compiled")
        || lower.contains("started")
        || lower.contains("local:")
    {
        return Color::Green;
    }

    Color::Gray
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_red() {
        assert_eq!(classify_log_body_color("Error: EADDRINUSE"), Color::Red);
        assert_eq!(classify_log_body_color("build failed"), Color::Red);
    }

    #[test]
    fn dev_server_ready_lines_are_green() {
        assert_eq!(classify_log_body_color("  ➜  Local:   http://localhost:5173/"), Color::Green);
        assert_eq!(classify_log_body_color("Server listening on 3000"), Color::Green);
    }

    #[test]
    fn warnings_and_plain_lines() {
        assert_eq!(classify_log_body_color("npm WARN deprecated"), Color::Yellow);
        assert_eq!(classify_log_body_color("GET /api 200"), Color::Gray);
    }
}

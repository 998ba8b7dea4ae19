use std::io;

use ratatui::{DefaultTerminal, Frame};

use crate::event_handler::KeyListener;
use crate::shutdown::Shutdown;
use crate::snapshot::DashboardSnapshot;

mod controls;
mod layout;
mod logs;
mod services;
mod status_bar;

/// Something that can show dashboard frames. `begin` and `end` bracket the
/// controller's running phase; nothing is drawn outside of it.
pub trait Renderer {
    fn begin(&mut self) -> io::Result<()>;
    fn draw(&mut self, snapshot: &DashboardSnapshot) -> io::Result<()>;
    fn end(&mut self);
}

/// Full-screen dashboard on the controlling terminal.
pub struct TerminalRenderer {
    terminal: Option<DefaultTerminal>,
    keys: Option<KeyListener>,
    shutdown: Shutdown,
    quit_key: char,
}

impl TerminalRenderer {
    pub fn new(shutdown: Shutdown, quit_key: char) -> Self {
        Self {
            terminal: None,
            keys: None,
            shutdown,
            quit_key,
        }
    }
}

impl Renderer for TerminalRenderer {
    fn begin(&mut self) -> io::Result<()> {
        let mut terminal = ratatui::try_init()?;
        terminal.clear()?;
        self.terminal = Some(terminal);
        self.keys = Some(KeyListener::spawn(self.shutdown.clone(), self.quit_key)?);
        Ok(())
    }

    fn draw(&mut self, snapshot: &DashboardSnapshot) -> io::Result<()> {
        let quit_key = self.quit_key;
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.draw(|frame| render(frame, snapshot, quit_key))?;
        }
        Ok(())
    }

    fn end(&mut self) {
        if let Some(keys) = self.keys.take() {
            keys.stop();
        }
        if self.terminal.take().is_some() {
            ratatui::restore();
        }
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        self.end();
    }
}

pub fn render(frame: &mut Frame, snapshot: &DashboardSnapshot, quit_key: char) {
    let sections = layout::build(frame.area(), snapshot.services.len());

    status_bar::render(frame, snapshot, sections.status_bar);
    services::render(frame, snapshot, sections.frame, &sections.panels);
    controls::render(frame, quit_key, sections.controls);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::Local;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    use crate::snapshot::ServiceView;
    use crate::status::Status;

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn draw(snapshot: &DashboardSnapshot) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|frame| render(frame, snapshot, 'q'))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            taken_at: Local::now(),
            services: vec![
                ServiceView {
                    name: "frontend".to_string(),
                    enabled: false,
                    command: "npm run dev".to_string(),
                    directory: PathBuf::from("/srv/web"),
                    status: Status::NotStarted,
                    logs: vec![],
                },
                ServiceView {
                    name: "backend".to_string(),
                    enabled: true,
                    command: "node server".to_string(),
                    directory: PathBuf::from("/srv/api"),
                    status: Status::Running,
                    logs: vec!["listening on :3000".to_string()],
                },
            ],
        }
    }

    #[test]
    fn draws_command_directory_status_and_logs() {
        let text = draw(&snapshot());
        assert!(text.contains("Development servers"));
        assert!(text.contains("Command: node server"));
        assert!(text.contains("Directory: /srv/api"));
        assert!(text.contains("Status: Running"));
        assert!(text.contains("listening on :3000"));
        assert!(text.contains("1/1 running"));
    }

    #[test]
    fn disabled_service_is_marked() {
        let text = draw(&snapshot());
        assert!(text.contains("Status: Disabled"));
        assert!(text.contains("(disabled)"));
    }

    #[test]
    fn waiting_placeholder_before_first_line() {
        let mut snap = snapshot();
        snap.services[1].logs.clear();
        let text = draw(&snap);
        assert!(text.contains("(waiting for output)"));
    }

    #[test]
    fn shows_newest_lines_when_logs_overflow() {
        let mut snap = snapshot();
        snap.services[1].logs = (1..=20).map(|i| format!("log line {:02}", i)).collect();
        let text = draw(&snap);
        assert!(text.contains("log line 20"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).unwrap();
        terminal
            .draw(|frame| render(frame, &snapshot(), 'q'))
            .unwrap();
    }
}

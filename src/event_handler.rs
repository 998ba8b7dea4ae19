use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::shutdown::{Reason, Shutdown};

const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Raw mode turns Ctrl+C into a key press instead of SIGINT, so while the
/// dashboard is up the keyboard is watched on its own thread and quit keys
/// are routed into the same shutdown channel as OS signals.
pub struct KeyListener {
    done: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl KeyListener {
    pub fn spawn(shutdown: Shutdown, quit_key: char) -> io::Result<Self> {
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);

        let handle = thread::Builder::new()
            .name("dashboard-keys".to_string())
            .spawn(move || {
                while !flag.load(Ordering::Relaxed) && !shutdown.is_triggered() {
                    match event::poll(POLL_TIMEOUT) {
                        Ok(true) => match event::read() {
                            Ok(Event::Key(key)) => {
                                if let Some(reason) = quit_reason(&key, quit_key) {
                                    shutdown.trigger(reason);
                                }
                            }
                            Ok(_) => {}
                            Err(e) => {
                                debug!(error = %e, "keyboard read failed");
                                return;
                            }
                        },
                        Ok(false) => {}
                        Err(e) => {
                            debug!(error = %e, "keyboard poll failed");
                            return;
                        }
                    }
                }
            })?;

        Ok(Self {
            done,
            handle: Some(handle),
        })
    }

    /// Stops polling so the terminal can be handed back in cooked mode.
    pub fn stop(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.done.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        self.finish();
    }
}

fn quit_reason(key: &KeyEvent, quit_key: char) -> Option<Reason> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Reason::Interrupt)
        }
        KeyCode::Char(c) if c == quit_key => Some(Reason::QuitKey),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_counts_as_interrupt() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(quit_reason(&key, 'q'), Some(Reason::Interrupt));
    }

    #[test]
    fn configured_quit_key() {
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(quit_reason(&key, 'x'), Some(Reason::QuitKey));
        assert_eq!(quit_reason(&key, 'q'), None);
    }

    #[test]
    fn plain_c_and_releases_are_ignored() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(quit_reason(&key, 'q'), None);

        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(quit_reason(&release, 'q'), None);
    }
}

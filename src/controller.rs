use std::io;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::Result;
use crate::shutdown::{self, Shutdown};
use crate::supervisor::Supervisor;
use crate::ui::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Drives one session: start the services, refresh the dashboard while any
/// of them is alive, then stop everything exactly once.
pub struct Controller {
    settings: Settings,
    supervisor: Supervisor,
    shutdown: Shutdown,
    phase: Phase,
    handle_signals: bool,
}

impl Controller {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            supervisor: Supervisor::new(),
            shutdown: Shutdown::new(),
            phase: Phase::Starting,
            handle_signals: true,
        }
    }

    /// Leaves SIGINT/SIGTERM alone; shutdown then only comes from the
    /// renderer's keys or the services exiting.
    pub fn without_signal_handlers(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn supervisor(&mut self) -> &mut Supervisor {
        &mut self.supervisor
    }

    pub async fn run<R: Renderer>(&mut self, renderer: &mut R) -> Result<()> {
        self.phase = Phase::Starting;

        let signals = if self.handle_signals {
            Some(shutdown::spawn_signal_listener(self.shutdown.clone())?)
        } else {
            None
        };

        let result = self.start_and_watch(renderer).await;

        self.stop().await;
        if let Some(signals) = signals {
            signals.abort();
        }
        result
    }

    async fn start_and_watch<R: Renderer>(&mut self, renderer: &mut R) -> Result<()> {
        self.supervisor.start_all(&self.settings.services)?;

        if self.shutdown.is_triggered() {
            return Ok(());
        }

        info!("servers started, press Ctrl+C or '{}' to stop", self.settings.quit_key);
        self.phase = Phase::Running;

        let watched = self.watch(renderer).await;
        renderer.end();
        match self.shutdown.reason() {
            Some(reason) => info!("received {}, stopping servers", reason),
            None if watched.is_ok() => info!("all servers exited"),
            None => {}
        }
        Ok(watched?)
    }

    async fn watch<R: Renderer>(&mut self, renderer: &mut R) -> io::Result<()> {
        renderer.begin()?;

        let mut ticker = tokio::time::interval(self.settings.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.shutdown.is_triggered() && self.supervisor.is_running() {
            let snapshot = self.supervisor.snapshot(&self.settings.services);
            renderer.draw(&snapshot)?;

            tokio::select! {
                _ = ticker.tick() => {}
                reason = self.shutdown.triggered() => {
                    debug!(%reason, "leaving dashboard");
                }
            }
        }
        Ok(())
    }

    async fn stop(&mut self) {
        if matches!(self.phase, Phase::Stopping | Phase::Stopped) {
            return;
        }
        self.phase = Phase::Stopping;

        if self.supervisor.is_running() {
            info!("stopping servers...");
        }
        self.supervisor.stop_all().await;

        self.phase = Phase::Stopped;
        info!("all servers stopped");
    }
}

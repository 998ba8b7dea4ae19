use std::collections::HashMap;

use chrono::Local;
use tracing::info;

use crate::error::{Error, Result};
use crate::process::ProcessHandle;
use crate::service::ServiceConfig;
use crate::snapshot::{DashboardSnapshot, ServiceView};
use crate::status::{Status, StopOutcome};

/// Owns every started service. Entries are only added during startup;
/// afterwards the map is polled and stopped in place.
#[derive(Default)]
pub struct Supervisor {
    processes: HashMap<String, ProcessHandle>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts every enabled service in order and stops at the first one that
    /// fails to spawn. Services started before the failure keep running;
    /// the caller is expected to `stop_all`.
    pub fn start_all(&mut self, configs: &[ServiceConfig]) -> Result<()> {
        let enabled: Vec<&ServiceConfig> = configs.iter().filter(|c| c.enabled).collect();
        if enabled.is_empty() {
            return Err(Error::NoServicesEnabled);
        }

        for config in enabled {
            self.start_process(config.clone())?;
        }
        Ok(())
    }

    pub fn start_process(&mut self, config: ServiceConfig) -> Result<()> {
        let name = config.name.clone();
        let mut handle = ProcessHandle::new(config);
        handle.start()?;
        self.processes.insert(name, handle);
        Ok(())
    }

    pub fn is_running(&mut self) -> bool {
        self.processes
            .values_mut()
            .any(|handle| handle.status().is_running())
    }

    pub fn status(&mut self, name: &str) -> Status {
        self.processes
            .get_mut(name)
            .map(|handle| handle.status())
            .unwrap_or(Status::NotStarted)
    }

    pub fn logs(&self, name: &str) -> Vec<String> {
        self.processes
            .get(name)
            .map(|handle| handle.logs().snapshot())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Stops each running service in turn. Services that already exited
    /// are skipped, so calling this again is harmless.
    pub async fn stop_all(&mut self) -> Vec<(String, StopOutcome)> {
        let mut outcomes = Vec::with_capacity(self.processes.len());
        for (name, handle) in self.processes.iter_mut() {
            let outcome = handle.stop().await;
            if outcome == StopOutcome::Killed {
                info!(service = %name, "killed after grace period");
            }
            outcomes.push((name.clone(), outcome));
        }
        outcomes
    }

    /// Copies the current state of every configured service, including the
    /// disabled ones, into a frame for the dashboard.
    pub fn snapshot(&mut self, configs: &[ServiceConfig]) -> DashboardSnapshot {
        let services = configs
            .iter()
            .map(|config| ServiceView {
                name: config.name.clone(),
                enabled: config.enabled,
                command: config.command_line.clone(),
                directory: config.working_directory.clone(),
                status: self.status(&config.name),
                logs: self.logs(&config.name),
            })
            .collect();

        DashboardSnapshot {
            taken_at: Local::now(),
            services,
        }
    }
}

use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::status::Status;

/// Everything the dashboard needs for one frame, copied out of the
/// supervisor so rendering never touches live state.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub taken_at: DateTime<Local>,
    pub services: Vec<ServiceView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceView {
    pub name: String,
    pub enabled: bool,
    pub command: String,
    pub directory: PathBuf,
    pub status: Status,
    pub logs: Vec<String>,
}

impl ServiceView {
    pub fn title(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.enabled && self.status.is_running()
    }
}

impl DashboardSnapshot {
    pub fn running_count(&self) -> usize {
        self.services.iter().filter(|s| s.is_running()).count()
    }

    pub fn enabled_count(&self) -> usize {
        self.services.iter().filter(|s| s.enabled).count()
    }
}

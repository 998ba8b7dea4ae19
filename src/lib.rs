//! Supervise a frontend and a backend dev server side by side, with a live
//! terminal dashboard of their status and latest output.

pub mod config;
pub mod controller;
pub mod error;
pub mod event_handler;
pub mod process;
pub mod service;
pub mod shutdown;
pub mod snapshot;
pub mod status;
pub mod supervisor;
pub mod ui;

pub use config::{Cli, Settings};
pub use controller::{Controller, Phase};
pub use error::{Error, Result};
pub use supervisor::Supervisor;

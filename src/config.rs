use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::service::ServiceConfig;

pub const DEFAULT_FRONTEND_CMD: &str = "npm run dev";
pub const DEFAULT_BACKEND_CMD: &str = "node server";
pub const DEFAULT_CONFIG_FILE: &str = "devdash.toml";
const DEFAULT_REFRESH_MS: u64 = 500;
const DEFAULT_QUIT_KEY: char = 'q';

#[derive(Parser, Debug, Default)]
#[command(
    name = "devdash",
    version,
    about = "Start frontend and backend development servers."
)]
pub struct Cli {
    /// Command for the frontend server [default: "npm run dev"]
    #[arg(long)]
    pub frontend_cmd: Option<String>,

    /// Command for the backend server [default: "node server"]
    #[arg(long)]
    pub backend_cmd: Option<String>,

    /// Working directory for the frontend server [default: .]
    #[arg(long)]
    pub frontend_dir: Option<PathBuf>,

    /// Working directory for the backend server [default: .]
    #[arg(long)]
    pub backend_dir: Option<PathBuf>,

    /// Do not start the frontend server.
    #[arg(long)]
    pub skip_frontend: bool,

    /// Do not start the backend server.
    #[arg(long)]
    pub skip_backend: bool,

    /// Path to a TOML config file (default: ./devdash.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Dashboard refresh interval in milliseconds.
    #[arg(long)]
    pub refresh_ms: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub frontend: ServiceSection,
    pub backend: ServiceSection,
    pub dashboard: DashboardSection,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceSection {
    pub command: Option<String>,
    pub dir: Option<PathBuf>,
    pub enabled: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardSection {
    pub refresh_ms: Option<u64>,
    pub quit_key: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// An explicit `--config` must exist; the default file is optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    debug!(path = %path.display(), "loading config");
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Fully resolved settings: CLI flags win over the file, the file wins over
/// built-in defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub services: Vec<ServiceConfig>,
    pub refresh_interval: Duration,
    pub quit_key: char,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let file = FileConfig::discover(cli.config.as_deref())?;
        Self::resolve(cli, file)
    }

    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self> {
        let frontend = resolve_service(
            "frontend",
            cli.frontend_cmd.as_deref(),
            cli.frontend_dir.as_deref(),
            cli.skip_frontend,
            file.frontend,
            DEFAULT_FRONTEND_CMD,
        )?;
        let backend = resolve_service(
            "backend",
            cli.backend_cmd.as_deref(),
            cli.backend_dir.as_deref(),
            cli.skip_backend,
            file.backend,
            DEFAULT_BACKEND_CMD,
        )?;

        let refresh_ms = cli
            .refresh_ms
            .or(file.dashboard.refresh_ms)
            .unwrap_or(DEFAULT_REFRESH_MS)
            .max(1);
        let quit_key = file
            .dashboard
            .quit_key
            .as_deref()
            .and_then(|key| key.chars().next())
            .unwrap_or(DEFAULT_QUIT_KEY);

        // Panels are laid out in this order, backend on the left.
        Ok(Self {
            services: vec![backend, frontend],
            refresh_interval: Duration::from_millis(refresh_ms),
            quit_key,
        })
    }
}

fn resolve_service(
    name: &str,
    cli_cmd: Option<&str>,
    cli_dir: Option<&Path>,
    skip: bool,
    section: ServiceSection,
    default_cmd: &str,
) -> Result<ServiceConfig> {
    let command = cli_cmd
        .map(str::to_string)
        .or(section.command)
        .unwrap_or_else(|| default_cmd.to_string());
    let dir = cli_dir
        .map(Path::to_path_buf)
        .or(section.dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let enabled = !skip && section.enabled.unwrap_or(true);

    ServiceConfig::parse(name, command, &dir, enabled)
}

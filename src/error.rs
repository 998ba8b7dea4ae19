use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions raised while configuring or starting services.
///
/// Nothing past startup produces one of these: a closed output stream just
/// ends the reader, and a child that ignores SIGTERM is killed outright.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to start {service} (`{command}` in {}): {source}", directory.display())]
    Spawn {
        service: String,
        command: String,
        directory: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{service}: command cannot be empty")]
    EmptyCommand { service: String },

    #[error("{service}: could not parse command `{command}`: {reason}")]
    InvalidCommand {
        service: String,
        command: String,
        reason: shell_words::ParseError,
    },

    #[error("nothing to run, enable the frontend or the backend")]
    NoServicesEnabled,

    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

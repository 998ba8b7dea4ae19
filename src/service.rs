use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One supervised unit, fixed once configuration is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub name: String,
    /// The command as the user wrote it, for display.
    pub command_line: String,
    pub command: Vec<String>,
    pub working_directory: PathBuf,
    pub enabled: bool,
}

impl ServiceConfig {
    /// Splits `command_line` with shell quoting rules. A disabled service
    /// is never spawned, so its command is allowed to be empty or malformed.
    pub fn parse(
        name: impl Into<String>,
        command_line: impl Into<String>,
        working_directory: &Path,
        enabled: bool,
    ) -> Result<Self> {
        let name = name.into();
        let command_line = command_line.into();

        let command = match shell_words::split(&command_line) {
            Ok(parts) => parts,
            Err(reason) if enabled => {
                return Err(Error::InvalidCommand {
                    service: name,
                    command: command_line,
                    reason,
                });
            }
            Err(_) => Vec::new(),
        };

        if enabled && command.is_empty() {
            return Err(Error::EmptyCommand { service: name });
        }

        let working_directory =
            std::path::absolute(working_directory).unwrap_or_else(|_| working_directory.to_path_buf());

        Ok(Self {
            name,
            command_line,
            command,
            working_directory,
            enabled,
        })
    }
}

use std::process::Command;

use crate::error::QrLabelError;
use log::debug;

const LIST_COMMAND: &str = "lpstat";

/// Live lookup of the printers the spooler currently knows about. Only the
/// settings flow consults this; dispatch trusts the configured name.
pub trait PrinterDirectory: Send + Sync {
    fn list_printers(&self) -> Result<Vec<String>, QrLabelError>;
}

/// Queries CUPS via `lpstat -e`, which prints one destination per line.
pub struct CupsDirectory {
    command: String,
}

impl CupsDirectory {
    pub fn new() -> Self {
        Self {
            command: LIST_COMMAND.to_string(),
        }
    }

    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for CupsDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl PrinterDirectory for CupsDirectory {
    fn list_printers(&self) -> Result<Vec<String>, QrLabelError> {
        let output = Command::new(&self.command)
            .arg("-e")
            .output()
            .map_err(|err| QrLabelError::Directory(err.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(QrLabelError::Directory(stderr.trim().to_string()));
        }

        let printers: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        debug!("directory listed {} printers", printers.len());
        Ok(printers)
    }
}

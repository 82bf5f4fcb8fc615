use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::QrLabelError;
use crate::settings::SettingStore;
use log::{debug, info, warn};

/// Printer used when neither a saved setting nor an environment default
/// exists.
pub const FALLBACK_PRINTER: &str = "autoprinter";

const PRINT_COMMAND: &str = "lp";

/// Sends composed documents to a named printer through the local spooler's
/// command-line utility.
///
/// Dispatches are serialized behind a mutex and each document is spooled to
/// its own file, flushed and fsynced before the print command runs.
pub struct PrintDispatcher {
    store: Arc<dyn SettingStore>,
    env_default: Option<String>,
    command: String,
    spool_dir: PathBuf,
    lock: Mutex<()>,
    seq: AtomicU64,
}

impl PrintDispatcher {
    pub fn new(store: Arc<dyn SettingStore>, env_default: Option<String>) -> Self {
        Self {
            store,
            env_default,
            command: PRINT_COMMAND.to_string(),
            spool_dir: std::env::temp_dir(),
            lock: Mutex::new(()),
            seq: AtomicU64::new(0),
        }
    }

    /// Replace the print command (tests point this at a fake `lp`).
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_spool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spool_dir = dir.into();
        self
    }

    /// Target printer: saved setting, else environment default, else the
    /// hardcoded fallback. A broken settings store falls through.
    pub fn resolve_printer(&self) -> String {
        match self.store.load() {
            Ok(Some(name)) => return name,
            Ok(None) => {}
            Err(err) => warn!("could not load printer setting: {err}"),
        }
        self.env_default
            .clone()
            .unwrap_or_else(|| FALLBACK_PRINTER.to_string())
    }

    /// Spool `document` and print it on the resolved printer, waiting for
    /// the print command to finish.
    pub fn dispatch(&self, document: &[u8]) -> Result<(), QrLabelError> {
        let printer = self.resolve_printer();
        self.dispatch_to(&printer, document)
    }

    /// As [`dispatch`](Self::dispatch), but to an explicit printer.
    pub fn dispatch_to(&self, printer: &str, document: &[u8]) -> Result<(), QrLabelError> {
        let _guard = self.lock_dispatch();

        let path = self.spool_dir.join(format!(
            "qr-label-{}-{}.pdf",
            std::process::id(),
            self.seq.fetch_add(1, Ordering::Relaxed)
        ));

        // the print command must never race an incomplete write
        let mut file = File::create(&path)?;
        file.write_all(document)?;
        file.flush()?;
        file.sync_all()?;
        drop(file);
        debug!("document spooled to {}", path.display());

        info!(
            "running print command: {} -d {} {}",
            self.command,
            printer,
            path.display()
        );
        let output = Command::new(&self.command)
            .arg("-d")
            .arg(printer)
            .arg(&path)
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            info!("{} stdout: {}", self.command, stdout.trim());
        }
        if !stderr.trim().is_empty() {
            info!("{} stderr: {}", self.command, stderr.trim());
        }

        if !output.status.success() {
            // keep the spooled document around for diagnosis
            return Err(QrLabelError::Print {
                stderr: stderr.trim().to_string(),
            });
        }

        // the spooler has its own copy by now
        if let Err(err) = fs::remove_file(&path) {
            warn!("could not remove spooled document {}: {err}", path.display());
        }

        Ok(())
    }

    fn lock_dispatch(&self) -> MutexGuard<'_, ()> {
        match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

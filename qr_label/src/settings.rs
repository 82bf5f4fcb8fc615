use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::QrLabelError;
use log::warn;
use serde::{Deserialize, Serialize};

/// The single persisted record: the operator's default printer.
#[derive(Debug, Serialize, Deserialize)]
struct PrinterSetting {
    printer: String,
}

/// Store for the default printer name. Injected into the dispatcher and the
/// settings page so tests can substitute their own.
pub trait SettingStore: Send + Sync {
    /// Returns the saved printer name, or `None` if nothing was ever saved
    /// or the record is unreadable as a setting.
    fn load(&self) -> Result<Option<String>, QrLabelError>;

    /// Overwrites the record with `printer`. Last write wins.
    fn save(&self, printer: &str) -> Result<(), QrLabelError>;
}

/// JSON file-backed store holding `{"printer": "<name>"}`.
pub struct FileSettingStore {
    path: PathBuf,
}

impl FileSettingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingStore for FileSettingStore {
    fn load(&self) -> Result<Option<String>, QrLabelError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(QrLabelError::SettingStore(err.to_string())),
        };

        match serde_json::from_slice::<PrinterSetting>(&bytes) {
            Ok(setting) => Ok(Some(setting.printer)),
            Err(err) => {
                // a corrupt record means "no value", not a fatal error
                warn!("unreadable printer setting at {}: {err}", self.path.display());
                Ok(None)
            }
        }
    }

    fn save(&self, printer: &str) -> Result<(), QrLabelError> {
        let record = serde_json::to_vec(&PrinterSetting {
            printer: printer.to_string(),
        })
        .map_err(|err| QrLabelError::SettingStore(err.to_string()))?;

        // write a sibling temp file and rename so a concurrent load never
        // observes a partial record
        let tmp = self.path.with_extension("tmp");
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(&record)?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        };
        write().map_err(|err| QrLabelError::SettingStore(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_store(tag: &str) -> FileSettingStore {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        let dir = std::env::temp_dir().join(format!(
            "qr_label-settings-{tag}-{}-{nanos}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        FileSettingStore::new(dir.join("printer_settings.json"))
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = scratch_store("roundtrip");
        store.save("LaserJet1").unwrap();
        assert_eq!(store.load().unwrap(), Some("LaserJet1".to_string()));
    }

    #[test]
    fn load_without_save_is_none() {
        let store = scratch_store("missing");
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn corrupt_record_loads_as_none() {
        let store = scratch_store("corrupt");
        fs::write(store.path(), b"{ not json").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_overwrites_previous_value() {
        let store = scratch_store("overwrite");
        store.save("OldPrinter").unwrap();
        store.save("NewPrinter").unwrap();
        assert_eq!(store.load().unwrap(), Some("NewPrinter".to_string()));
    }
}

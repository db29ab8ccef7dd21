//! Durable calibration snapshots, one JSON file per camera mount.

use std::fs;
use std::path::PathBuf;

use log::warn;

use crate::calibration::CalibrationData;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Snapshot store keyed by mount/session id. Snapshots survive process
/// restarts; a missing or corrupt snapshot simply means the caller has to
/// re-enter calibration.
pub struct CalibrationStore {
    base_dir: PathBuf,
}

impl CalibrationStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn snapshot_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }

    /// Restore a snapshot. Missing, unreadable or structurally invalid
    /// snapshots all yield `None`; re-calibration is the recovery path.
    pub fn load(&self, key: &str) -> Option<CalibrationData> {
        let path = self.snapshot_path(key);
        if !path.exists() {
            return None;
        }

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("unreadable calibration snapshot {}: {err}", path.display());
                return None;
            }
        };

        match serde_json::from_str::<CalibrationData>(&raw) {
            Ok(data) => match data.validate() {
                Ok(()) => Some(data),
                Err(err) => {
                    warn!("invalid calibration snapshot {}: {err}", path.display());
                    None
                }
            },
            Err(err) => {
                warn!("corrupt calibration snapshot {}: {err}", path.display());
                None
            }
        }
    }

    pub fn save(&self, key: &str, data: &CalibrationData) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_dir)?;
        let json = serde_json::to_string_pretty(data)?;
        fs::write(self.snapshot_path(key), json)?;
        Ok(())
    }
}

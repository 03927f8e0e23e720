//! Cross-platform application paths

use std::fs;
use std::path::PathBuf;

use crate::DaemonError;

#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self, DaemonError> {
        let data_dir = Self::get_data_dir()?;

        // Ensure directory exists
        fs::create_dir_all(&data_dir)?;

        Ok(Self { data_dir })
    }

    fn get_data_dir() -> Result<PathBuf, DaemonError> {
        let base = dirs::data_dir().ok_or(DaemonError::NoDataDir)?;
        Ok(base.join("vigil"))
    }

    #[allow(dead_code)]
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    #[allow(dead_code)]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("vigild.log")
    }
}

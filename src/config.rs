use std::path::{Path, PathBuf};

use crate::storage::FileBackend;

pub const DATA_DIR_ENV: &str = "THESIS_PORTAL_DATA_DIR";
const DEFAULT_DATA_DIR: &str = ".thesis-portal";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    /// Resolve settings from `.env`, the environment, and an optional CLI
    /// override, in increasing priority.
    pub fn from_env(data_dir: Option<PathBuf>) -> Self {
        dotenvy::dotenv().ok();

        let data_dir = data_dir
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Self { data_dir }
    }

    pub fn local_storage(&self) -> FileBackend {
        FileBackend::new(self.data_dir.join("local_storage.json"))
    }

    pub fn session_storage(&self) -> FileBackend {
        FileBackend::new(self.data_dir.join("session_storage.json"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

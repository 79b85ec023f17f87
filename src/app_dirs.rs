//! Where waveview keeps its config file and logs.
//!
//! Everything lives in one `.waveview` folder. Its parent is the OS config
//! directory unless `WAVEVIEW_CONFIG_HOME` names another one. The `_in` variants
//! take the parent explicitly.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Folder created under the base directory.
pub const APP_DIR_NAME: &str = ".waveview";
/// Environment variable that replaces the OS config directory as the base.
pub const CONFIG_HOME_ENV: &str = "WAVEVIEW_CONFIG_HOME";
const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum AppDirError {
    /// Neither the environment nor the OS provided a base directory.
    #[error("No base directory for .waveview: set WAVEVIEW_CONFIG_HOME or a user config dir")]
    NoBaseDir,
    #[error("Could not create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// `.waveview` under the resolved base directory, created on demand.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    app_root_dir_in(&base_dir()?)
}

/// `.waveview/logs` under the resolved base directory, created on demand.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    logs_dir_in(&base_dir()?)
}

pub fn app_root_dir_in(base: &Path) -> Result<PathBuf, AppDirError> {
    create(base.join(APP_DIR_NAME))
}

pub fn logs_dir_in(base: &Path) -> Result<PathBuf, AppDirError> {
    create(app_root_dir_in(base)?.join(LOGS_DIR_NAME))
}

fn base_dir() -> Result<PathBuf, AppDirError> {
    match std::env::var_os(CONFIG_HOME_ENV) {
        Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => BaseDirs::new()
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(AppDirError::NoBaseDir),
    }
}

fn create(dir: PathBuf) -> Result<PathBuf, AppDirError> {
    match std::fs::create_dir_all(&dir) {
        Ok(()) => Ok(dir),
        Err(source) => Err(AppDirError::CreateDir { path: dir, source }),
    }
}

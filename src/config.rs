//! Stream and envelope settings persisted as TOML.
//!
//! Missing files and missing keys fall back to defaults, so an empty or absent
//! `config.toml` behaves like a fresh install.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;
use crate::envelope::DEFAULT_WINDOW_SIZE;
use crate::sample::EightBitEncoding;
use crate::stream::DEFAULT_SAMPLES_PER_FRAME;

/// Default filename used to store the settings.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that may occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No platform config directory could be resolved.
    #[error("No suitable config directory available")]
    NoConfigDir,
    /// Failed to create the config directory.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write a config file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to serialize config to TOML.
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
}

/// Tunables shared by the stream factory, readers and envelope computation.
///
/// Config keys (TOML): `samples_per_frame`, `envelope_window`,
/// `eight_bit_encoding`, `extensions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Samples per channel requested by each frame read.
    #[serde(default = "default_samples_per_frame")]
    pub samples_per_frame: usize,
    /// Samples reduced into one RMS bar.
    #[serde(default = "default_envelope_window")]
    pub envelope_window: usize,
    /// How 8-bit payloads are centered when decoded.
    #[serde(default)]
    pub eight_bit_encoding: EightBitEncoding,
    /// File extensions the factory accepts, compared case-insensitively.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            samples_per_frame: DEFAULT_SAMPLES_PER_FRAME,
            envelope_window: DEFAULT_WINDOW_SIZE,
            eight_bit_encoding: EightBitEncoding::default(),
            extensions: default_extensions(),
        }
    }
}

impl StreamSettings {
    /// Replace zero sizes with defaults and lowercase extensions.
    pub fn normalized(self) -> Self {
        let extensions: Vec<String> = self
            .extensions
            .into_iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self {
            samples_per_frame: nonzero_or(self.samples_per_frame, DEFAULT_SAMPLES_PER_FRAME),
            envelope_window: nonzero_or(self.envelope_window, DEFAULT_WINDOW_SIZE),
            eight_bit_encoding: self.eight_bit_encoding,
            extensions: if extensions.is_empty() {
                default_extensions()
            } else {
                extensions
            },
        }
    }

    /// True when `path` carries one of the accepted extensions.
    pub fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

fn default_samples_per_frame() -> usize {
    DEFAULT_SAMPLES_PER_FRAME
}

fn default_envelope_window() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_extensions() -> Vec<String> {
    vec!["wav".to_string(), "wave".to_string()]
}

fn nonzero_or(value: usize, fallback: usize) -> usize {
    if value == 0 { fallback } else { value }
}

/// Resolve the default settings path inside the application directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load settings from `path`, returning defaults if the file is missing.
pub fn load_or_default(path: &Path) -> Result<StreamSettings, ConfigError> {
    if !path.exists() {
        return Ok(StreamSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<StreamSettings>(&text)
        .map(StreamSettings::normalized)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
}

/// Write settings to `path` atomically, creating parent directories as needed.
pub fn save(settings: &StreamSettings, path: &Path) -> Result<(), ConfigError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let data = toml::to_string_pretty(settings).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    let write_error = |source: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(data.as_bytes()).map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;
    tmp.persist(path).map_err(|err| write_error(err.error))?;
    Ok(())
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}

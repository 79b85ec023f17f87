//! Tracing subscriber setup for hosts embedding the stream core.
//!
//! The core itself only emits `tracing` events. Hosts that want them on disk call
//! [`init`] (or [`init_default`]) once; output goes to stdout and to a
//! timestamped per-launch file, and only the newest files are kept.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs;

/// Log files kept per directory, newest first.
const MAX_LOG_FILES: usize = 10;
const LOG_FILE_PREFIX: &str = "waveview";
const DEFAULT_FILTER: &str = "info";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// No platform-specific directory could be resolved for logs.
    #[error("No suitable directory available for logs")]
    NoLogDir,
    /// Failed to create or access the log directory.
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to list or prune existing log files.
    #[error("Failed to prune old logs in {path}: {source}")]
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to format a timestamp for the log filename.
    #[error("Failed to format log filename time: {0}")]
    FormatTime(time::error::Format),
    /// Another global subscriber was installed before this one.
    #[error("A global tracing subscriber is already installed")]
    AlreadyInstalled,
    /// Installing the global subscriber failed.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize tracing with log files under the application logs directory.
pub fn init_default() -> Result<(), LoggingError> {
    let dir = app_dirs::logs_dir().map_err(|error| match error {
        app_dirs::AppDirError::NoBaseDir => LoggingError::NoLogDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            LoggingError::CreateDir { path, source }
        }
    })?;
    init(&dir)
}

/// Initialize tracing to write to stdout and a new log file inside `log_dir`.
///
/// Subsequent calls are no-ops. When a foreign subscriber is already installed
/// nothing on disk is touched. Old logs are pruned only once this subscriber is
/// live; a pruning failure is logged rather than returned.
pub fn init(log_dir: &Path) -> Result<(), LoggingError> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }
    if subscriber_installed() {
        return Err(LoggingError::AlreadyInstalled);
    }
    fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDir {
        path: log_dir.to_path_buf(),
        source,
    })?;
    let file_name = log_file_name(now_local_or_utc())?;

    let (file_writer, guard) = tracing_appender::non_blocking(rolling::never(log_dir, &file_name));
    let timer = build_timer();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = Registry::default()
        .with(filter)
        .with(
            fmt::layer()
                .with_timer(timer.clone())
                .with_writer(std::io::stdout),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;
    let _ = LOG_GUARD.set(guard);

    let current = log_dir.join(&file_name);
    tracing::info!("Logging to {}", current.display());
    if let Err(err) = prune_old_logs(log_dir, MAX_LOG_FILES.saturating_sub(1), &current) {
        tracing::warn!("{err}");
    }
    Ok(())
}

fn subscriber_installed() -> bool {
    tracing::dispatcher::get_default(|dispatch| {
        !dispatch.is::<tracing::subscriber::NoSubscriber>()
    })
}

fn build_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, DISPLAY_FORMAT.into())
}

/// Delete the oldest `waveview_*.log` files other than `current` until at most `keep` remain.
fn prune_old_logs(dir: &Path, keep: usize, current: &Path) -> Result<(), LoggingError> {
    let prune_error = |source: std::io::Error| LoggingError::Prune {
        path: dir.to_path_buf(),
        source,
    };
    let mut logs: Vec<(SystemTime, PathBuf)> = fs::read_dir(dir)
        .map_err(prune_error)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path != current && is_own_log_file(path))
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .collect();

    logs.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, path) in logs.into_iter().skip(keep) {
        fs::remove_file(&path).map_err(prune_error)?;
    }
    Ok(())
}

fn is_own_log_file(path: &Path) -> bool {
    path.is_file()
        && path.extension().and_then(|ext| ext.to_str()) == Some("log")
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX))
}

fn log_file_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    let stamp = now.format(NAME_FORMAT).map_err(LoggingError::FormatTime)?;
    Ok(format!("{LOG_FILE_PREFIX}_{stamp}.log"))
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Duration};
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn log_file_name_has_prefix_and_timestamp() {
        let fixed = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(
            log_file_name(fixed).unwrap(),
            "waveview_2023-11-14_22-13-20.log"
        );
    }

    #[test]
    fn prune_keeps_newest_files() {
        let dir = tempdir().unwrap();
        for idx in 0..12 {
            touch(&dir.path().join(format!("waveview_{idx:02}.log")));
            thread::sleep(Duration::from_millis(10));
        }

        let current = dir.path().join("waveview_00.log");
        prune_old_logs(dir.path(), 9, &current).unwrap();
        let mut remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(remaining.len(), 10);
        assert_eq!(remaining[0], "waveview_00.log");
        assert_eq!(remaining[1], "waveview_03.log");
    }

    #[test]
    fn prune_leaves_foreign_files_alone() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("other_app.log"));
        touch(&dir.path().join("waveview_notes.txt"));
        touch(&dir.path().join("waveview_a.log"));

        prune_old_logs(dir.path(), 0, &dir.path().join("waveview_new.log")).unwrap();
        assert!(dir.path().join("other_app.log").exists());
        assert!(dir.path().join("waveview_notes.txt").exists());
        assert!(!dir.path().join("waveview_a.log").exists());
    }

    #[test]
    fn foreign_subscriber_leaves_log_dir_untouched() {
        let _ = tracing::subscriber::set_global_default(tracing_subscriber::registry());
        let dir = tempdir().unwrap();
        for idx in 0..12 {
            touch(&dir.path().join(format!("waveview_{idx:02}.log")));
        }

        let err = init(dir.path()).unwrap_err();
        assert!(matches!(err, LoggingError::AlreadyInstalled));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 12);
    }
}

//! Tracing setup for the `masklabel` binaries.
//!
//! Every run gets its own `<prefix>_<timestamp>.log` under the app logs
//! folder plus a copy on stdout. `RUST_LOG` filters both; the default is
//! `info`. Old runs are pruned per prefix, so the GUI and the dataset builder
//! keep separate histories.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};

/// Runs kept per binary prefix, the current one included.
const RUNS_KEPT: usize = 10;
const FILE_STAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
const LINE_STAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

static FILE_WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error(transparent)]
    LogsDir(#[from] AppDirError),
    #[error("Could not stamp log file name: {0}")]
    Timestamp(time::error::Format),
    #[error("Could not open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Listing or deleting earlier runs failed.
    #[error("Could not prune old logs in {path}: {source}")]
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Another subscriber was installed before us.
    #[error("A tracing subscriber is already installed: {0}")]
    AlreadyInstalled(tracing::subscriber::SetGlobalDefaultError),
}

/// Start logging for the binary named `prefix`.
///
/// Only the first call does anything. Callers print the error and carry on
/// without file logging.
pub fn init(prefix: &str) -> Result<(), LoggingError> {
    if FILE_WRITER_GUARD.get().is_some() {
        return Ok(());
    }

    let dir = app_dirs::logs_dir()?;
    let run = LogFile::create(&dir, prefix, local_now())?;
    let (file_writer, guard) = tracing_appender::non_blocking(rolling::never(&dir, &run.name));
    prune_runs(&dir, prefix, RUNS_KEPT)?;

    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = fmt::time::OffsetTime::new(offset, LINE_STAMP);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_timer(timer.clone()).with_writer(std::io::stdout))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::AlreadyInstalled)?;
    let _ = FILE_WRITER_GUARD.set(guard);

    tracing::info!(log_file = %run.path.display(), "Logging started");
    Ok(())
}

/// The file one run writes to.
struct LogFile {
    name: String,
    path: PathBuf,
}

impl LogFile {
    /// Create `<prefix>_<stamp>.log` in `dir` up front, so a run that logs
    /// nothing still leaves a file and counts toward pruning.
    fn create(dir: &Path, prefix: &str, now: OffsetDateTime) -> Result<Self, LoggingError> {
        let stamp = now.format(FILE_STAMP).map_err(LoggingError::Timestamp)?;
        let name = format!("{prefix}_{stamp}.log");
        let path = dir.join(&name);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LoggingError::OpenFile {
                path: path.clone(),
                source,
            })?;
        Ok(Self { name, path })
    }
}

fn belongs_to(path: &Path, prefix: &str) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    name.ends_with(".log")
        && name
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('_'))
}

/// Delete the oldest `prefix` runs until at most `keep` remain.
fn prune_runs(dir: &Path, prefix: &str, keep: usize) -> Result<(), LoggingError> {
    let prune_error = |source| LoggingError::Prune {
        path: dir.to_path_buf(),
        source,
    };
    let mut runs: Vec<(SystemTime, PathBuf)> = fs::read_dir(dir)
        .map_err(prune_error)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && belongs_to(path, prefix))
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .collect();
    if runs.len() <= keep {
        return Ok(());
    }
    runs.sort();
    let stale = runs.len() - keep;
    for (_, path) in runs.into_iter().take(stale) {
        fs::remove_file(&path).map_err(prune_error)?;
    }
    Ok(())
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

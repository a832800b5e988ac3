//! Where masklabel keeps its own files.
//!
//! Everything sits in one `.masklabel` folder under the OS config directory.
//! `MASKLABEL_CONFIG_HOME` moves that base elsewhere, which the integration
//! tests use to stay out of the real home directory.

use std::{
    path::PathBuf,
    sync::{LazyLock, Mutex},
};

use directories::BaseDirs;
use thiserror::Error;

pub const APP_DIR_NAME: &str = ".masklabel";
/// Replaces the OS config directory as the parent of [`APP_DIR_NAME`].
pub const CONFIG_HOME_ENV: &str = "MASKLABEL_CONFIG_HOME";
const LOGS_DIR_NAME: &str = "logs";

/// Unit tests point the base here instead of touching the process env.
static TEST_BASE: LazyLock<Mutex<Option<PathBuf>>> = LazyLock::new(|| Mutex::new(None));

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No home or config directory found; set {CONFIG_HOME_ENV}")]
    NoBaseDir,
    #[error("Could not create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The `.masklabel` folder, created on first use.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = base_dir().ok_or(AppDirError::NoBaseDir)?;
    create(base.join(APP_DIR_NAME))
}

/// `.masklabel/logs`, created on first use.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    create(app_root_dir()?.join(LOGS_DIR_NAME))
}

fn create(path: PathBuf) -> Result<PathBuf, AppDirError> {
    match std::fs::create_dir_all(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(AppDirError::CreateDir { path, source }),
    }
}

/// Test override, then the env variable, then the platform config dir.
fn base_dir() -> Option<PathBuf> {
    let pinned = TEST_BASE.lock().ok().and_then(|base| base.clone());
    pinned
        .or_else(|| std::env::var_os(CONFIG_HOME_ENV).map(PathBuf::from))
        .or_else(|| BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    static SERIAL: Mutex<()> = Mutex::new(());

    /// Pins the base for one test at a time and clears it on drop.
    struct PinnedBase {
        _serial: std::sync::MutexGuard<'static, ()>,
    }

    impl PinnedBase {
        fn at(path: PathBuf) -> Self {
            let serial = SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            *TEST_BASE.lock().unwrap() = Some(path);
            Self { _serial: serial }
        }
    }

    impl Drop for PinnedBase {
        fn drop(&mut self) {
            if let Ok(mut base) = TEST_BASE.lock() {
                *base = None;
            }
        }
    }

    #[test]
    fn root_and_logs_live_under_the_pinned_base() {
        let base = tempdir().unwrap();
        let _pinned = PinnedBase::at(base.path().to_path_buf());
        let root = app_root_dir().unwrap();
        assert_eq!(root, base.path().join(APP_DIR_NAME));
        assert!(root.is_dir());
        let logs = logs_dir().unwrap();
        assert_eq!(logs, root.join("logs"));
        assert!(logs.is_dir());
    }

    #[test]
    fn a_file_in_the_way_is_a_create_error() {
        let base = tempdir().unwrap();
        std::fs::write(base.path().join(APP_DIR_NAME), b"not a dir").unwrap();
        let _pinned = PinnedBase::at(base.path().to_path_buf());
        let err = app_root_dir().unwrap_err();
        assert!(matches!(err, AppDirError::CreateDir { ref path, .. } if path.ends_with(APP_DIR_NAME)));
    }
}

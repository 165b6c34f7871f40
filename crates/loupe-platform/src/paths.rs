use std::path::{Path, PathBuf};

use crate::error::PlatformError;

const APP_DIR: &str = "loupe";

/// Standard locations for loupe's files.
pub trait PlatformPaths: Send + Sync {
    /// Directory holding `config.toml`.
    fn config_dir(&self) -> PathBuf;
    /// Directory holding persisted session data.
    fn data_dir(&self) -> PathBuf;

    /// Directory holding diagnostic logs (`<data_dir>/logs`).
    fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    /// The persisted project state (`<data_dir>/project.json`).
    fn project_file(&self) -> PathBuf {
        self.data_dir().join("project.json")
    }
}

/// [`PlatformPaths`] backed by the OS conventions reported by `dirs`,
/// falling back to dot-directories under `$HOME`.
#[derive(Debug, Clone)]
pub struct DefaultPaths {
    config: PathBuf,
    data: PathBuf,
}

impl DefaultPaths {
    /// Resolve the platform directories.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Path`] when neither the OS directories nor
    /// a home directory can be determined.
    pub fn new() -> Result<Self, PlatformError> {
        let home = dirs::home_dir().or_else(|| std::env::var_os("HOME").map(PathBuf::from));
        let config = dirs::config_dir()
            .or_else(|| home.as_ref().map(|h| h.join(".config")))
            .ok_or_else(|| PlatformError::Path("could not determine config directory".into()))?;
        let data = dirs::data_dir()
            .or_else(|| home.as_ref().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| PlatformError::Path("could not determine data directory".into()))?;
        tracing::debug!(config = %config.display(), data = %data.display(), "resolved platform paths");
        Ok(Self {
            config: config.join(APP_DIR),
            data: data.join(APP_DIR),
        })
    }
}

impl PlatformPaths for DefaultPaths {
    fn config_dir(&self) -> PathBuf {
        self.config.clone()
    }

    fn data_dir(&self) -> PathBuf {
        self.data.clone()
    }
}

/// Every location under one root directory. Used by tests and by
/// `--home` style overrides.
#[derive(Debug, Clone)]
pub struct FixedPaths {
    root: PathBuf,
}

impl FixedPaths {
    /// Place config under `root/config` and data under `root/data`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl PlatformPaths for FixedPaths {
    fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_end_with_app_dir() {
        let paths = DefaultPaths::new().expect("should resolve platform dirs");
        assert!(paths.config_dir().ends_with(APP_DIR));
        assert!(paths.data_dir().ends_with(APP_DIR));
    }

    #[test]
    fn log_dir_and_project_file_live_under_data_dir() {
        let paths = DefaultPaths::new().expect("should resolve platform dirs");
        assert!(paths.log_dir().starts_with(paths.data_dir()));
        assert!(paths.project_file().starts_with(paths.data_dir()));
        assert_eq!(
            paths.project_file().file_name().unwrap(),
            "project.json"
        );
    }

    #[test]
    fn fixed_paths_are_rooted() {
        let paths = FixedPaths::new("/tmp/loupe-test");
        assert_eq!(paths.config_dir(), PathBuf::from("/tmp/loupe-test/config"));
        assert_eq!(
            paths.log_dir(),
            PathBuf::from("/tmp/loupe-test/data/logs")
        );
    }

    #[test]
    fn paths_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DefaultPaths>();
        assert_send_sync::<FixedPaths>();
    }
}

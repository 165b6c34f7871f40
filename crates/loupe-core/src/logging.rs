//! Diagnostic log file helpers.
//!
//! The `tracing-subscriber` setup lives in the binary; this module only
//! decides where the file goes, keeps it from growing without bound, and
//! turns level names into filter directives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Size at which the active log file is rotated (10 MB).
pub const DEFAULT_MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated generations kept next to the active file.
pub const DEFAULT_MAX_LOG_FILES: u32 = 5;

/// File name of the active log.
pub const LOG_FILE_NAME: &str = "loupe.log";

/// The log file inside `log_dir`.
pub fn log_file_in(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

/// Prepare `log_path` for writing: create its directory and rotate it if it
/// has grown past `max_size`.
pub fn prepare_log_file(log_path: &Path, max_size: u64, max_files: u32) -> io::Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    rotate_log_files(log_path, max_size, max_files)
}

/// Rotate `log_path` once it is at least `max_size` bytes.
///
/// `loupe.log` becomes `loupe.log.1`, `.1` becomes `.2`, and so on; the
/// generation numbered `max_files` is deleted. A missing or small file is
/// left alone.
pub fn rotate_log_files(log_path: &Path, max_size: u64, max_files: u32) -> io::Result<()> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if size < max_size || max_files == 0 {
        return Ok(());
    }

    let oldest = generation(log_path, max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for n in (1..max_files).rev() {
        let from = generation(log_path, n);
        if from.exists() {
            fs::rename(&from, generation(log_path, n + 1))?;
        }
    }
    fs::rename(log_path, generation(log_path, 1))?;
    tracing::debug!("rotated {}", log_path.display());
    Ok(())
}

/// Map a level name (any case) to a filter directive; unknown names map to
/// `"info"`.
pub fn level_filter(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

fn generation(base: &Path, n: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_in_uses_fixed_name() {
        assert_eq!(
            log_file_in(Path::new("/var/log")),
            PathBuf::from("/var/log/loupe.log")
        );
    }

    #[test]
    fn generation_appends_number() {
        let base = Path::new("/tmp/loupe.log");
        assert_eq!(generation(base, 2), PathBuf::from("/tmp/loupe.log.2"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        rotate_log_files(&dir.path().join("loupe.log"), 10, 3).unwrap();
    }

    #[test]
    fn small_file_stays_in_place() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("loupe.log");
        fs::write(&log, "short").unwrap();
        rotate_log_files(&log, DEFAULT_MAX_LOG_SIZE, DEFAULT_MAX_LOG_FILES).unwrap();
        assert!(log.exists());
    }

    #[test]
    fn generations_shift_and_oldest_is_dropped() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("loupe.log");
        fs::write(dir.path().join("loupe.log.1"), "gen1").unwrap();
        fs::write(dir.path().join("loupe.log.2"), "gen2").unwrap();
        fs::write(&log, "x".repeat(64)).unwrap();

        rotate_log_files(&log, 32, 2).unwrap();

        assert!(!log.exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("loupe.log.1")).unwrap(),
            "x".repeat(64)
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("loupe.log.2")).unwrap(),
            "gen1"
        );
        assert!(!dir.path().join("loupe.log.3").exists());
    }

    #[test]
    fn prepare_creates_missing_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("a").join("b").join("loupe.log");
        prepare_log_file(&log, DEFAULT_MAX_LOG_SIZE, DEFAULT_MAX_LOG_FILES).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[test]
    fn level_filter_maps_names() {
        assert_eq!(level_filter("TRACE"), "trace");
        assert_eq!(level_filter("Debug"), "debug");
        assert_eq!(level_filter("warning"), "warn");
        assert_eq!(level_filter("error"), "error");
        assert_eq!(level_filter("verbose"), "info");
        assert_eq!(level_filter(""), "info");
    }
}

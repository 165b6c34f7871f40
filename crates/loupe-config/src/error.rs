use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, parsing or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The specified config file was not found.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// Writing the commented default config failed.
    #[error("failed to create default config: {0}")]
    CreateDefault(String),

    /// TOML parsing failed.
    #[error("TOML parse error: {0}")]
    Parse(String),

    /// A value is out of its allowed range.
    #[error("validation error: {field}: {message}")]
    Validation {
        /// Dotted field path (e.g. `session.recent_target_cap`).
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// Reading or writing a config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_contains_path() {
        let err = ConfigError::NotFound(PathBuf::from("/tmp/missing.toml"));
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.toml"));
        assert!(msg.contains("config file not found"));
    }

    #[test]
    fn parse_display_contains_details() {
        let err = ConfigError::Parse("expected `]`".into());
        assert_eq!(err.to_string(), "TOML parse error: expected `]`");
    }

    #[test]
    fn validation_display_names_field() {
        let err = ConfigError::Validation {
            field: "console.max_entries".into(),
            message: "must be at least 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "validation error: console.max_entries: must be at least 1"
        );
    }

    #[test]
    fn io_error_converts() {
        let inner = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = ConfigError::from(inner);
        assert!(err.to_string().contains("read-only"));
    }
}

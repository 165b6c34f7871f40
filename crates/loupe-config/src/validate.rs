use crate::config::Config;
use crate::error::ConfigError;

/// Largest accepted `session.recent_target_cap`.
pub const MAX_RECENT_TARGET_CAP: usize = 100;

/// Check `config`, collecting every violation.
pub fn validate(config: &Config) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let cap = config.session.recent_target_cap;
    if cap == 0 || cap > MAX_RECENT_TARGET_CAP {
        errors.push(ConfigError::Validation {
            field: "session.recent_target_cap".to_string(),
            message: format!("must be 1 to {MAX_RECENT_TARGET_CAP}, got {cap}"),
        });
    }

    if config.console.max_entries == 0 {
        errors.push(ConfigError::Validation {
            field: "console.max_entries".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    if let Some(file) = &config.log.file {
        if file.as_os_str().is_empty() {
            errors.push(ConfigError::Validation {
                field: "log.file".to_string(),
                message: "must not be empty".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Like [`validate`], but reduced to the first violation.
pub(crate) fn validate_first(config: &Config) -> Result<(), ConfigError> {
    validate(config).map_err(|errors| {
        errors
            .into_iter()
            .next()
            .unwrap_or_else(|| ConfigError::Validation {
                field: "unknown".to_string(),
                message: "validation failed".to_string(),
            })
    })
}

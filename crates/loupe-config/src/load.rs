use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::ConfigError;
use crate::merge::merge_configs;
use crate::validate::validate_first;

/// Name of the per-project config directory.
pub const PROJECT_DIR_NAME: &str = ".loupe";

const DEFAULT_CONFIG_CONTENT: &str = r#"# loupe configuration
# Uncomment and edit settings below to override defaults.

# [session]
# recent_target_cap = 10
# auto_load_most_recent = true

# [console]
# max_entries = 10000

# [log]
# level = "info"
# file = "/path/to/loupe.log"
"#;

/// Load the effective configuration.
///
/// `Config::default()` is overlaid with `config_dir/config.toml` (created
/// with commented defaults when missing), then with the nearest
/// `.loupe/config.toml` found walking upward from `project_dir`. The result
/// is validated.
///
/// # Errors
///
/// Returns [`ConfigError`] on I/O, parse or validation failure.
pub fn load_config(config_dir: &Path, project_dir: Option<&Path>) -> Result<Config, ConfigError> {
    let global_path = config_dir.join("config.toml");

    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir)?;
    }
    if !global_path.exists() {
        std::fs::write(&global_path, DEFAULT_CONFIG_CONTENT)
            .map_err(|e| ConfigError::CreateDefault(e.to_string()))?;
        tracing::info!("created default config at {}", global_path.display());
    }

    let mut config = Config::default();

    let global_content = std::fs::read_to_string(&global_path)?;
    if has_non_comment_content(&global_content) {
        config = merge_configs(&config, &global_content)?;
    }

    if let Some(project_path) = project_dir.and_then(find_project_config) {
        tracing::debug!("merging project config {}", project_path.display());
        let project_content = std::fs::read_to_string(&project_path)?;
        config = merge_configs(&config, &project_content)?;
    }

    validate_first(&config)?;
    Ok(config)
}

/// Parse and validate a TOML string.
///
/// # Errors
///
/// Returns [`ConfigError`] on parse or validation failure.
pub fn load_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_first(&config)?;
    Ok(config)
}

fn find_project_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_DIR_NAME).join("config.toml"))
        .find(|candidate| candidate.exists())
}

fn has_non_comment_content(content: &str) -> bool {
    content.lines().any(|l| {
        let trimmed = l.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#')
    })
}

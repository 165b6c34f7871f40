use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Log verbosity level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Most verbose.
    Trace,
    /// Debug messages.
    Debug,
    /// Informational messages (default).
    #[default]
    Info,
    /// Warnings only.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// The `tracing` filter directive for this level.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debugging-session behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How many recently loaded targets are remembered (1–100).
    #[serde(default = "default_recent_target_cap")]
    pub recent_target_cap: usize,
    /// Load the most recent target on startup.
    #[serde(default = "default_true")]
    pub auto_load_most_recent: bool,
}

fn default_recent_target_cap() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recent_target_cap: default_recent_target_cap(),
            auto_load_most_recent: true,
        }
    }
}

/// Debugger console settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Entries retained before the oldest are dropped.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_entries() -> usize {
    10_000
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log verbosity level.
    #[serde(default)]
    pub level: LogLevel,
    /// Log file; defaults to `<data_dir>/logs/loupe.log`.
    pub file: Option<PathBuf>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// `[session]`
    #[serde(default)]
    pub session: SessionConfig,
    /// `[console]`
    #[serde(default)]
    pub console: ConsoleConfig,
    /// `[log]`
    #[serde(default)]
    pub log: LogConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.session.recent_target_cap, 10);
        assert!(cfg.session.auto_load_most_recent);
        assert_eq!(cfg.console.max_entries, 10_000);
        assert_eq!(cfg.log.level, LogLevel::Info);
        assert!(cfg.log.file.is_none());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: Config = toml::from_str("[session]\nauto_load_most_recent = false\n").unwrap();
        assert!(!cfg.session.auto_load_most_recent);
        assert_eq!(cfg.session.recent_target_cap, 10);
    }

    #[test]
    fn log_level_parses_snake_case() {
        let cfg: Config = toml::from_str("[log]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(cfg.log.level, LogLevel::Debug);
        assert_eq!(cfg.log.level.to_string(), "debug");
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[log]\nlevel = \"loud\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn serialize_round_trips() {
        let mut cfg = Config::default();
        cfg.log.file = Some(PathBuf::from("/tmp/loupe.log"));
        let text = toml::to_string(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}

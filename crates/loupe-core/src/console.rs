//! The debugger console log.
//!
//! Lifecycle messages ("Process running", exit codes, rejected commands)
//! are appended here and mirrored to the console view. The log is bounded;
//! the oldest entries are dropped first.

use std::collections::VecDeque;
use std::fmt;

/// Severity of a console entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Lifecycle information.
    Info,
    /// Something was ignored or skipped.
    Warning,
    /// A command or refresh failed.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// One line of the console log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    level: LogLevel,
    text: String,
}

impl LogEntry {
    /// Create an entry.
    pub fn new(level: LogLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// Severity.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Text as shown to the user.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.text)
    }
}

/// Bounded, append-only console log.
#[derive(Debug, Clone)]
pub struct ConsoleLog {
    entries: VecDeque<LogEntry>,
    max_entries: usize,
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLog {
    /// Default number of retained entries.
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

    /// Create an empty log with the default bound.
    pub fn new() -> Self {
        Self::with_max_entries(Self::DEFAULT_MAX_ENTRIES)
    }

    /// Create an empty log retaining at most `max_entries` (at least one).
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Append an entry and return a reference to it.
    pub fn push(&mut self, level: LogLevel, text: impl Into<String>) -> &LogEntry {
        if self.entries.len() == self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry::new(level, text));
        &self.entries[self.entries.len() - 1]
    }

    /// Append an informational entry.
    pub fn info(&mut self, text: impl Into<String>) -> &LogEntry {
        self.push(LogLevel::Info, text)
    }

    /// Append a warning.
    pub fn warn(&mut self, text: impl Into<String>) -> &LogEntry {
        self.push(LogLevel::Warning, text)
    }

    /// Append an error.
    pub fn error(&mut self, text: impl Into<String>) -> &LogEntry {
        self.push(LogLevel::Error, text)
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been logged (or everything was cleared).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The retention bound.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Whether any entry's text equals `text`.
    pub fn contains(&self, text: &str) -> bool {
        self.entries.iter().any(|e| e.text == text)
    }

    /// Entries at or above `level`.
    pub fn at_least(&self, level: LogLevel) -> Vec<&LogEntry> {
        self.entries.iter().filter(|e| e.level >= level).collect()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

//! loupe-core: shared plumbing for the loupe front-end.
//!
//! The user-facing console log and the helpers that manage the diagnostic
//! log file.

pub mod console;
pub mod logging;

pub use console::{ConsoleLog, LogEntry, LogLevel};

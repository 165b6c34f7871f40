//! Value types handed out by the engine.
//!
//! Everything here is a snapshot: the engine owns the live objects and the
//! front-end only ever sees copies obtained through an
//! [`IndexedSequence`](crate::sequence::IndexedSequence).

use std::fmt;
use std::path::{Path, PathBuf};

/// Engine-assigned thread identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Engine-assigned breakpoint identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BreakpointId(pub u32);

impl fmt::Display for BreakpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a value whose children can be enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub u64);

/// Lifecycle state of the debuggee process, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessState {
    /// No process exists.
    #[default]
    Unloaded,
    /// Running and can't be examined.
    Running,
    /// Stopped and can be examined.
    Stopped,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unloaded => "unloaded",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// A module (executable or shared library) loaded into a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Short display name.
    pub name: String,
    /// Path on disk.
    pub path: PathBuf,
}

/// A thread of the current process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    /// Stable identifier.
    pub id: ThreadId,
    /// Display name (may be empty).
    pub name: String,
    /// Whether this is the process's current thread.
    pub is_current: bool,
}

/// One activation record of a thread's call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Function name, or a placeholder when unknown.
    pub function: String,
    /// Source file, when debug info provides one.
    pub file: Option<PathBuf>,
    /// Line number (1-based), when debug info provides one.
    pub line: Option<u32>,
}

impl Frame {
    /// A frame with a full source location.
    pub fn at(function: impl Into<String>, file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// A frame with no source information (e.g. library code).
    pub fn opaque(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            file: None,
            line: None,
        }
    }

    /// Whether the frame carries a line number.
    pub fn has_line_number(&self) -> bool {
        self.line.is_some()
    }

    /// The (file, line) pair when both are known.
    pub fn source_location(&self) -> Option<(&Path, u32)> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some((file.as_path(), line)),
            _ => None,
        }
    }
}

/// A breakpoint as seen by the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    /// Engine-assigned identifier.
    pub id: BreakpointId,
    /// Whether the breakpoint is enabled.
    pub enabled: bool,
}

/// A resolved address a breakpoint maps to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Source file.
    pub file: PathBuf,
    /// Line number (1-based).
    pub line: u32,
    /// Whether the engine resolved the location to code.
    pub resolved: bool,
}

impl Location {
    /// A resolved location.
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            resolved: true,
        }
    }

    /// Whether this location is exactly `(file, line)`.
    pub fn matches(&self, file: &Path, line: u32) -> bool {
        self.line == line && self.file == file
    }
}

/// A variable or expression result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    /// Handle for enumerating children.
    pub id: ValueId,
    /// Variable name.
    pub name: String,
    /// Type name.
    pub type_name: String,
    /// One-line rendering of the value.
    pub summary: String,
}

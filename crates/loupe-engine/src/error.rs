//! Engine error types.

use thiserror::Error;

/// Errors reported by the native engine or by the collection adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// An index was at or beyond the current length of a collection.
    #[error("index {index} out of range for collection of length {len}")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The collection length observed at the time of the request.
        len: usize,
    },

    /// The engine rejected a command.
    #[error("engine rejected {command}: {message}")]
    CallFailed {
        /// The command that was rejected (e.g. `launch`).
        command: String,
        /// The engine's explanation.
        message: String,
    },

    /// A selected thread or frame no longer exists.
    #[error("inconsistent selection: {what}")]
    InconsistentSelection {
        /// What went missing (e.g. `selected frame of thread 0x1`).
        what: String,
    },

    /// The operation needs a loaded target.
    #[error("no target loaded")]
    NoTarget,

    /// The operation needs a live process.
    #[error("no live process")]
    NoProcess,

    /// The process is in the wrong state for the operation.
    #[error("cannot {operation} while process is {state}")]
    InvalidState {
        /// The attempted operation.
        operation: String,
        /// The state the process was in.
        state: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::CallFailed`].
    pub fn call_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CallFailed {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from a bounds check.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

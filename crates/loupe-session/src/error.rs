use loupe_engine::EngineError;
use thiserror::Error;

/// Errors returned by session intents and project persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The engine rejected a command or an enumeration failed.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Reading or writing the project file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The project file is not valid JSON for [`ProjectState`](crate::ProjectState).
    #[error("project state JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The intent needs a loaded target.
    #[error("no target loaded")]
    NoTarget,

    /// The intent needs a stopped process.
    #[error("process is not stopped")]
    NotStopped,

    /// The intent needs a current thread.
    #[error("no thread selected")]
    NoThreadSelected,
}

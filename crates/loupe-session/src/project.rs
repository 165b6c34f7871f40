//! Persisted per-user project state.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Main-window placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 1280,
            height: 800,
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}{:+}{:+}", self.width, self.height, self.x, self.y)
    }
}

/// What survives between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectState {
    pub application_geometry: Option<Geometry>,
    /// Oldest first.
    pub recents: Vec<PathBuf>,
    /// Skip auto-loading the most recent target on startup.
    pub disable_most_recent: bool,
}

/// Where [`ProjectState`] is read from and written to.
pub trait ProjectStore {
    /// Read the stored state; a store with nothing saved yields defaults.
    fn load(&self) -> Result<ProjectState, SessionError>;

    /// Replace the stored state.
    fn save(&mut self, state: &ProjectState) -> Result<(), SessionError>;
}

/// [`ProjectStore`] backed by a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonProjectStore {
    path: PathBuf,
}

impl JsonProjectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProjectStore for JsonProjectStore {
    fn load(&self) -> Result<ProjectState, SessionError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no project state at {}", self.path.display());
                return Ok(ProjectState::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&mut self, state: &ProjectState) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, text)?;
        tracing::debug!("saved project state to {}", self.path.display());
        Ok(())
    }
}

/// [`ProjectStore`] kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProjectStore {
    state: ProjectState,
    saves: usize,
}

impl MemoryProjectStore {
    /// A store that already holds `state`.
    pub fn with_state(state: ProjectState) -> Self {
        Self { state, saves: 0 }
    }

    /// The last saved (or initial) state.
    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    /// How many times `save` was called.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl ProjectStore for MemoryProjectStore {
    fn load(&self) -> Result<ProjectState, SessionError> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &ProjectState) -> Result<(), SessionError> {
        self.state = state.clone();
        self.saves += 1;
        Ok(())
    }
}

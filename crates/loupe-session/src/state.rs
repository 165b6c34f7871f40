//! Front-end mirror of the engine's session.
//!
//! [`SessionState`] is written only by the [`Synchronizer`](crate::Synchronizer).
//! Everything the views show is derived from a cloned snapshot of it.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use loupe_engine::{BreakpointId, Frame, Location, Module, ThreadId, Value};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing loaded.
    #[default]
    NoTarget,
    /// A target is loaded and no process exists.
    TargetLoaded,
    /// A process was created and has not run yet.
    Launching,
    /// The process is running.
    Running,
    /// The process is stopped and can be examined.
    Stopped,
    /// The process exited; its object has not gone away yet.
    Exited,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::NoTarget => "no target",
            Phase::TargetLoaded => "target loaded",
            Phase::Launching => "launching",
            Phase::Running => "running",
            Phase::Stopped => "stopped",
            Phase::Exited => "exited",
        };
        f.write_str(name)
    }
}

/// The loaded target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMirror {
    pub path: PathBuf,
}

/// How the process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitInfo {
    pub status: i32,
    pub description: Option<String>,
}

/// The live process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMirror {
    pub pid: u32,
    /// Set once the process has exited.
    pub exit: Option<ExitInfo>,
}

/// One thread as fetched on the last stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMirror {
    pub id: ThreadId,
    pub name: String,
    pub is_current: bool,
    /// Innermost first.
    pub frames: Vec<Frame>,
    /// Index into `frames`; `None` when the engine's selection was
    /// inconsistent.
    pub selected_frame: Option<usize>,
}

impl ThreadMirror {
    /// The selected frame, if any.
    pub fn selected(&self) -> Option<&Frame> {
        self.selected_frame.and_then(|i| self.frames.get(i))
    }
}

/// One breakpoint with its resolved locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointMirror {
    pub id: BreakpointId,
    pub enabled: bool,
    pub locations: Vec<Location>,
}

/// Everything the front-end knows about the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    pub target: Option<TargetMirror>,
    pub process: Option<ProcessMirror>,
    /// Empty unless the process is stopped.
    pub threads: Vec<ThreadMirror>,
    pub breakpoints: Vec<BreakpointMirror>,
    pub modules: Vec<Module>,
    /// Locals of the current thread's selected frame.
    pub values: Vec<Value>,
    pub open_editors: BTreeSet<PathBuf>,
}

impl SessionState {
    /// Path of the loaded target.
    pub fn target_path(&self) -> Option<&Path> {
        self.target.as_ref().map(|t| t.path.as_path())
    }

    /// The current thread, if the process is stopped and has one.
    pub fn current_thread(&self) -> Option<&ThreadMirror> {
        self.threads.iter().find(|t| t.is_current)
    }

    /// The current thread's selected frame.
    pub fn selected_frame(&self) -> Option<&Frame> {
        self.current_thread().and_then(ThreadMirror::selected)
    }

    /// Whether `path` is open in an editor.
    pub fn is_open(&self, path: &Path) -> bool {
        self.open_editors.contains(path)
    }

    /// Start over for a freshly loaded target. Open editors survive.
    pub fn reset_for_target(&mut self, path: PathBuf) {
        let open_editors = std::mem::take(&mut self.open_editors);
        *self = Self {
            phase: Phase::TargetLoaded,
            target: Some(TargetMirror { path }),
            open_editors,
            ..Self::default()
        };
    }

    /// Forget the target and everything hanging off it. Open editors survive.
    pub fn clear(&mut self) {
        let open_editors = std::mem::take(&mut self.open_editors);
        *self = Self {
            open_editors,
            ..Self::default()
        };
    }

    /// Drop the per-stop data (threads and locals).
    pub fn clear_stop_data(&mut self) {
        self.threads.clear();
        self.values.clear();
    }

    /// Replace the thread mirror, keeping at most one current thread.
    pub fn set_threads(&mut self, mut threads: Vec<ThreadMirror>) {
        let mut seen_current = false;
        for thread in &mut threads {
            if thread.is_current {
                if seen_current {
                    tracing::debug!(thread = %thread.id, "engine reported a second current thread");
                    thread.is_current = false;
                }
                seen_current = true;
            }
        }
        self.threads = threads;
    }
}

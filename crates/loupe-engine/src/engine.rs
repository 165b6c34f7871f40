//! The command surface of the native debugging engine.

use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::model::{
    Breakpoint, BreakpointId, Frame, Location, Module, ProcessState, Thread, ThreadId, Value,
    ValueId,
};
use crate::sequence::IndexedSequence;

/// Commands and queries the front-end needs from a native engine.
///
/// Commands return quickly; their effects are reported later through the
/// engine's [`EngineEvent`](crate::event::EngineEvent) stream. The raw
/// `*_count` / `*_at` pairs exist for implementors. Callers enumerate
/// through the provided sequence methods ([`threads`](Self::threads),
/// [`frames`](Self::frames), ...) so bounds behavior is the same for every
/// collection.
pub trait DebugEngine {
    // -- target ----------------------------------------------------------

    /// Load the debuggee image at `path`, replacing any current target.
    fn load(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Path of the current target, if any.
    fn target_path(&self) -> Option<PathBuf>;

    /// Number of modules in the current target.
    fn module_count(&self) -> usize;

    /// Module at `index`.
    fn module_at(&self, index: usize) -> Result<Module, EngineError>;

    /// Number of breakpoints in the current target.
    fn breakpoint_count(&self) -> usize;

    /// Breakpoint at `index`.
    fn breakpoint_at(&self, index: usize) -> Result<Breakpoint, EngineError>;

    /// Number of resolved locations of breakpoint `id`.
    fn location_count(&self, id: BreakpointId) -> usize;

    /// Location `index` of breakpoint `id`.
    fn location_at(&self, id: BreakpointId, index: usize) -> Result<Location, EngineError>;

    /// Add a breakpoint at `(file, line)`.
    fn add_breakpoint(&mut self, file: &Path, line: u32) -> Result<BreakpointId, EngineError>;

    /// Remove breakpoint `id`.
    fn remove_breakpoint(&mut self, id: BreakpointId) -> Result<(), EngineError>;

    // -- session ---------------------------------------------------------

    /// Launch the current target.
    fn launch(&mut self) -> Result<(), EngineError>;

    /// Attach to the running process `pid`.
    fn attach(&mut self, pid: u32) -> Result<(), EngineError>;

    /// Connect to remote debug services at `uri`.
    fn connect(&mut self, uri: &str) -> Result<(), EngineError>;

    // -- process ---------------------------------------------------------

    /// State of the current process.
    fn process_state(&self) -> ProcessState;

    /// Kill the process.
    fn kill(&mut self) -> Result<(), EngineError>;

    /// Interrupt a running process.
    fn pause(&mut self) -> Result<(), EngineError>;

    /// Resume a stopped process.
    fn continue_execution(&mut self) -> Result<(), EngineError>;

    /// Number of threads in the process.
    fn thread_count(&self) -> usize;

    /// Thread at `index`.
    fn thread_at(&self, index: usize) -> Result<Thread, EngineError>;

    /// Make `id` the current thread.
    fn select_thread(&mut self, id: ThreadId) -> Result<(), EngineError>;

    // -- thread ----------------------------------------------------------

    /// Number of frames on `thread`'s stack.
    fn frame_count(&self, thread: ThreadId) -> usize;

    /// Frame `index` of `thread` (0 is innermost).
    fn frame_at(&self, thread: ThreadId, index: usize) -> Result<Frame, EngineError>;

    /// Index of `thread`'s selected frame.
    fn selected_frame_index(&self, thread: ThreadId) -> Result<usize, EngineError>;

    /// Select frame `index` of `thread`.
    fn select_frame(&mut self, thread: ThreadId, index: usize) -> Result<(), EngineError>;

    /// Step into the next call on `thread`.
    fn step_into(&mut self, thread: ThreadId) -> Result<(), EngineError>;

    /// Step over the next line on `thread`.
    fn step_over(&mut self, thread: ThreadId) -> Result<(), EngineError>;

    /// Run `thread` until the current function returns.
    fn step_out(&mut self, thread: ThreadId) -> Result<(), EngineError>;

    // -- values ----------------------------------------------------------

    /// Root value whose children are the locals of frame `frame` on `thread`.
    fn locals(&self, thread: ThreadId, frame: usize) -> Option<ValueId>;

    /// Number of children of `value`.
    fn child_count(&self, value: ValueId) -> usize;

    /// Child `index` of `value`.
    fn child_at(&self, value: ValueId, index: usize) -> Result<Value, EngineError>;

    // -- sequences -------------------------------------------------------

    /// Modules of the current target.
    fn modules(&self) -> IndexedSequence<'_, Module> {
        IndexedSequence::new(move || self.module_count(), move |i| self.module_at(i))
    }

    /// Breakpoints of the current target.
    fn breakpoints(&self) -> IndexedSequence<'_, Breakpoint> {
        IndexedSequence::new(
            move || self.breakpoint_count(),
            move |i| self.breakpoint_at(i),
        )
    }

    /// Threads of the current process.
    fn threads(&self) -> IndexedSequence<'_, Thread> {
        IndexedSequence::new(move || self.thread_count(), move |i| self.thread_at(i))
    }

    /// Frames of `thread`, innermost first.
    fn frames(&self, thread: ThreadId) -> IndexedSequence<'_, Frame> {
        IndexedSequence::new(
            move || self.frame_count(thread),
            move |i| self.frame_at(thread, i),
        )
    }

    /// Resolved locations of breakpoint `id`.
    fn locations(&self, id: BreakpointId) -> IndexedSequence<'_, Location> {
        IndexedSequence::new(
            move || self.location_count(id),
            move |i| self.location_at(id, i),
        )
    }

    /// Children of `value`.
    fn children(&self, value: ValueId) -> IndexedSequence<'_, Value> {
        IndexedSequence::new(move || self.child_count(value), move |i| self.child_at(value, i))
    }

    /// The breakpoint with a location exactly at `(file, line)`, if any.
    fn find_breakpoint(&self, file: &Path, line: u32) -> Result<Option<BreakpointId>, EngineError> {
        for breakpoint in &self.breakpoints() {
            let breakpoint = breakpoint?;
            for location in &self.locations(breakpoint.id) {
                if location?.matches(file, line) {
                    return Ok(Some(breakpoint.id));
                }
            }
        }
        Ok(None)
    }
}

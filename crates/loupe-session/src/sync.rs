//! The session synchronization state machine.
//!
//! Each engine event is handled to completion on the control thread:
//! engine data is gathered first (any enumeration failure aborts the
//! refresh before anything is committed), then committed to
//! [`SessionState`], then every notification is derived from a snapshot of
//! the committed state.

use std::path::{Path, PathBuf};

use loupe_core::ConsoleLog;
use loupe_engine::{
    DebugEngine, EngineError, EngineEvent, EventReceiver, ProcessState, ThreadId, Value, ValueId,
};

use crate::bus::{
    ActionKind, DockKind, MarkerKind, Notification, NotificationBus, Surface, ToolbarKind,
};
use crate::derive::{self, HighlightMarkers, MarkerSet};
use crate::error::SessionError;
use crate::format;
use crate::state::{BreakpointMirror, ExitInfo, Phase, ProcessMirror, SessionState, ThreadMirror};

/// Drives the views from engine events and forwards user intents.
#[derive(Debug)]
pub struct Synchronizer<E: DebugEngine> {
    engine: E,
    events: EventReceiver,
    bus: NotificationBus,
    state: SessionState,
    console: ConsoleLog,
}

struct StopData {
    threads: Vec<ThreadMirror>,
    values: Vec<Value>,
}

impl<E: DebugEngine> Synchronizer<E> {
    /// Create a synchronizer for `engine`, draining `events`.
    pub fn new(engine: E, events: EventReceiver) -> Self {
        Self {
            engine,
            events,
            bus: NotificationBus::new(),
            state: SessionState::default(),
            console: ConsoleLog::new(),
        }
    }

    /// Replace the console log (e.g. to apply a configured bound).
    pub fn with_console(mut self, console: ConsoleLog) -> Self {
        self.console = console;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Direct engine access, for scripting the engine in tests and demos.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut NotificationBus {
        &mut self.bus
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    /// Handle every queued event. Returns how many were handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.events.try_next() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next event and handle it. Returns `false` once the
    /// engine side of the queue is gone.
    pub async fn process_next(&mut self) -> bool {
        match self.events.next().await {
            Some(event) => {
                self.handle(event);
                true
            }
            None => false,
        }
    }

    /// Handle one engine event.
    pub fn handle(&mut self, event: EngineEvent) {
        tracing::debug!(event = event.name(), phase = %self.state.phase, "engine event");
        match event {
            EngineEvent::TargetChanged { path: Some(path) } => self.on_target_loaded(path),
            EngineEvent::TargetChanged { path: None } => self.on_target_unloaded(),
            EngineEvent::ProcessBegin { pid } => self.on_process_begin(pid),
            EngineEvent::Running => self.on_running(),
            EngineEvent::Ready => self.on_ready(),
            EngineEvent::Exited {
                status,
                description,
            } => self.on_exited(status, description),
            EngineEvent::ProcessEnd => self.on_process_end(),
            EngineEvent::BreakpointsChanged { target } => self.on_breakpoints_changed(&target),
        }
    }

    // -- event handlers ----------------------------------------------------

    /// A failed module or breakpoint enumeration keeps that part of the
    /// previous mirror and its views; the rest of the reset still happens.
    fn on_target_loaded(&mut self, path: PathBuf) {
        tracing::info!(path = %path.display(), "target loaded");
        let modules = self.gather("refresh modules", |e| e.modules().try_collect());
        let breakpoints = self.gather("refresh breakpoints", |e| fetch_breakpoints(e));
        let modules_fetched = modules.is_some();
        let breakpoints_fetched = breakpoints.is_some();

        let previous_modules = std::mem::take(&mut self.state.modules);
        let previous_breakpoints = std::mem::take(&mut self.state.breakpoints);
        self.state.reset_for_target(path);
        self.state.modules = modules.unwrap_or(previous_modules);
        self.state.breakpoints = breakpoints.unwrap_or(previous_breakpoints);
        let snapshot = self.state.clone();

        self.hide_process_surfaces();
        for editor in &snapshot.open_editors {
            self.clear_markers(editor, &MarkerKind::HIGHLIGHTS);
        }
        self.show(Surface::Toolbar(ToolbarKind::Target));
        if modules_fetched {
            self.set_contents(DockKind::Modules, format::modules(&snapshot.modules));
        }
        if breakpoints_fetched {
            self.set_contents(DockKind::Breakpoints, format::breakpoints(&snapshot.breakpoints));
            self.publish_breakpoint_markers(&snapshot);
        }
    }

    fn on_target_unloaded(&mut self) {
        tracing::info!("target unloaded");
        self.state.clear();
        let snapshot = self.state.clone();

        self.hide(Surface::Toolbar(ToolbarKind::Target));
        self.hide_process_surfaces();
        for editor in &snapshot.open_editors {
            self.clear_markers(
                editor,
                &[
                    MarkerKind::CurrentLine,
                    MarkerKind::ActiveLine,
                    MarkerKind::Breakpoint,
                ],
            );
        }
        self.set_contents(DockKind::Modules, String::new());
        self.set_contents(DockKind::Breakpoints, String::new());
    }

    fn on_process_begin(&mut self, pid: u32) {
        if self.state.target.is_none() {
            tracing::debug!(pid, "process-begin without a target; ignored");
            return;
        }
        tracing::info!(pid, "process created");
        self.state.process = Some(ProcessMirror { pid, exit: None });
        self.state.clear_stop_data();
        self.state.phase = Phase::Launching;

        for dock in DockKind::PROCESS {
            self.show(Surface::Dock(dock));
        }
        self.show(Surface::Toolbar(ToolbarKind::Process));
    }

    fn on_running(&mut self) {
        if !self.require_process("running") {
            return;
        }
        self.state.phase = Phase::Running;
        self.state.clear_stop_data();
        let snapshot = self.state.clone();

        self.bus.publish(
            &Surface::Action(ActionKind::PauseContinue),
            &Notification::SetContents("Pause".into()),
        );
        self.publish_highlights(&snapshot);
        self.hide(Surface::Toolbar(ToolbarKind::CurrentThread));
        self.publish_stop_views(&snapshot);
        self.info("Process running");
    }

    fn on_ready(&mut self) {
        if !self.require_process("ready") {
            return;
        }
        let Some(data) = self.gather("refresh threads", |e| fetch_stop_data(e)) else {
            return;
        };
        self.state.phase = Phase::Stopped;
        self.bus.publish(
            &Surface::Action(ActionKind::PauseContinue),
            &Notification::SetContents("Continue".into()),
        );
        self.commit_stopped(data);
        self.info("Process ready to debug");
    }

    fn on_exited(&mut self, status: i32, description: Option<String>) {
        if !self.require_process("exited") {
            return;
        }
        self.info(format!("Process exited with code {status}"));
        if let Some(desc) = &description {
            self.info(format!("  {desc}"));
        }
        if let Some(process) = self.state.process.as_mut() {
            process.exit = Some(ExitInfo {
                status,
                description,
            });
        }
        self.state.phase = Phase::Exited;
        self.state.clear_stop_data();
        let snapshot = self.state.clone();

        self.hide_process_surfaces();
        self.publish_highlights(&snapshot);
    }

    fn on_process_end(&mut self) {
        if self.state.process.is_none() {
            tracing::debug!("process-end without a process; ignored");
            return;
        }
        tracing::info!("process ended");
        self.state.process = None;
        self.state.clear_stop_data();
        self.state.phase = if self.state.target.is_some() {
            Phase::TargetLoaded
        } else {
            Phase::NoTarget
        };
        let snapshot = self.state.clone();

        self.hide_process_surfaces();
        self.publish_highlights(&snapshot);
    }

    fn on_breakpoints_changed(&mut self, target: &Path) {
        if self.state.target_path() != Some(target) {
            tracing::debug!(path = %target.display(), "breakpoints changed for another target; ignored");
            return;
        }
        let Some(breakpoints) = self.gather("refresh breakpoints", |e| fetch_breakpoints(e))
        else {
            return;
        };
        self.state.breakpoints = breakpoints;
        let snapshot = self.state.clone();

        self.publish_breakpoint_markers(&snapshot);
        self.set_contents(DockKind::Breakpoints, format::breakpoints(&snapshot.breakpoints));
    }

    /// Re-fetch threads, frames and locals and republish everything derived
    /// from them. Used on thread/frame selection.
    fn refresh_stopped(&mut self) {
        if let Some(data) = self.gather("refresh threads", |e| fetch_stop_data(e)) {
            self.commit_stopped(data);
        }
    }

    fn commit_stopped(&mut self, data: StopData) {
        self.state.set_threads(data.threads);
        self.state.values = data.values;
        self.reveal_selected_frame();
        let snapshot = self.state.clone();

        self.publish_highlights(&snapshot);
        self.show(Surface::Toolbar(ToolbarKind::CurrentThread));
        self.publish_stop_views(&snapshot);
    }

    /// Open (if needed) and focus the editor for the current thread's
    /// selected frame.
    fn reveal_selected_frame(&mut self) {
        let Some((file, line)) = self
            .state
            .selected_frame()
            .and_then(|f| f.source_location())
            .map(|(file, line)| (file.to_path_buf(), line))
        else {
            return;
        };
        if self.state.open_editors.insert(file.clone()) {
            let editor = Surface::Editor(file.clone());
            self.bus.publish(&editor, &Notification::Show);
            let markers = derive::breakpoint_markers(&self.state);
            self.apply_markers(&file, MarkerKind::Breakpoint, &markers);
        }
        self.bus
            .publish(&Surface::Editor(file), &Notification::Focus { line });
    }

    // -- intents -----------------------------------------------------------

    /// Load the target at `path`.
    pub fn load_target(&mut self, path: &Path) -> Result<(), SessionError> {
        self.command(&format!("load {}", path.display()), |e| e.load(path))
    }

    /// Launch the loaded target.
    pub fn launch(&mut self) -> Result<(), SessionError> {
        self.require_target()?;
        self.command("launch", |e| e.launch())
    }

    /// Attach to process `pid`.
    pub fn attach(&mut self, pid: u32) -> Result<(), SessionError> {
        self.require_target()?;
        self.command(&format!("attach to {pid}"), |e| e.attach(pid))
    }

    /// Connect to remote debug services.
    pub fn connect(&mut self, uri: &str) -> Result<(), SessionError> {
        self.command(&format!("connect to {uri}"), |e| e.connect(uri))?;
        self.info(format!("Connected to {uri}"));
        Ok(())
    }

    /// Kill the process.
    pub fn kill(&mut self) -> Result<(), SessionError> {
        self.command("kill", |e| e.kill())
    }

    /// Continue when the engine reports the process stopped, pause otherwise.
    pub fn toggle_pause(&mut self) -> Result<(), SessionError> {
        if self.engine.process_state() == ProcessState::Stopped {
            self.command("continue", |e| e.continue_execution())
        } else {
            self.command("pause", |e| e.pause())
        }
    }

    /// Step into on the current thread.
    pub fn step_into(&mut self) -> Result<(), SessionError> {
        let thread = self.stopped_thread()?;
        self.command("step into", |e| e.step_into(thread))
    }

    /// Step over on the current thread.
    pub fn step_over(&mut self) -> Result<(), SessionError> {
        let thread = self.stopped_thread()?;
        self.command("step over", |e| e.step_over(thread))
    }

    /// Step out on the current thread.
    pub fn step_out(&mut self) -> Result<(), SessionError> {
        let thread = self.stopped_thread()?;
        self.command("step out", |e| e.step_out(thread))
    }

    /// Make `id` the current thread and refresh everything that depends on
    /// it.
    pub fn select_thread(&mut self, id: ThreadId) -> Result<(), SessionError> {
        if self.state.phase != Phase::Stopped {
            return Err(SessionError::NotStopped);
        }
        self.command(&format!("select thread {id}"), |e| e.select_thread(id))?;
        self.refresh_stopped();
        Ok(())
    }

    /// Select frame `index` of the current thread.
    pub fn select_frame(&mut self, index: usize) -> Result<(), SessionError> {
        let thread = self.stopped_thread()?;
        self.command(&format!("select frame {index}"), |e| e.select_frame(thread, index))?;
        self.refresh_stopped();
        Ok(())
    }

    /// Remove the breakpoint at exactly `(file, line)`, or add one there.
    ///
    /// Markers follow from the engine's breakpoints-changed event.
    pub fn toggle_breakpoint(&mut self, file: &Path, line: u32) -> Result<(), SessionError> {
        self.require_target()?;
        let what = format!("toggle breakpoint at {}:{line}", file.display());
        self.command(&what, |e| {
            let existing = e.find_breakpoint(file, line)?;
            match existing {
                Some(id) => e.remove_breakpoint(id),
                None => e.add_breakpoint(file, line).map(|_| ()),
            }
        })
    }

    /// A view opened an editor for `file`.
    pub fn editor_opened(&mut self, file: &Path) {
        self.state.open_editors.insert(file.to_path_buf());
        let highlights = derive::highlight_markers(&self.state);
        let breakpoints = derive::breakpoint_markers(&self.state);
        self.apply_highlights(file, &highlights);
        self.apply_markers(file, MarkerKind::Breakpoint, &breakpoints);
    }

    /// A view closed the editor for `file`. Returns whether it was open.
    pub fn editor_closed(&mut self, file: &Path) -> bool {
        self.state.open_editors.remove(file)
    }

    /// Children of `value`, for expanding an entry of the values dock.
    pub fn value_children(&mut self, value: ValueId) -> Result<Vec<Value>, SessionError> {
        let children = self.engine.children(value).try_collect();
        children.map_err(|err| {
            self.report_failure("expand value", &err);
            err.into()
        })
    }

    // -- helpers -------------------------------------------------------------

    /// Run an engine command, logging a rejection.
    fn command<T>(
        &mut self,
        what: &str,
        f: impl FnOnce(&mut E) -> Result<T, EngineError>,
    ) -> Result<T, SessionError> {
        f(&mut self.engine).map_err(|err| {
            self.report_failure(what, &err);
            err.into()
        })
    }

    /// Run a fallible engine enumeration; on failure log it and return
    /// `None` so the caller can abort before committing anything.
    fn gather<T>(&mut self, what: &str, f: impl FnOnce(&E) -> Result<T, EngineError>) -> Option<T> {
        match f(&self.engine) {
            Ok(data) => Some(data),
            Err(err) => {
                self.report_failure(what, &err);
                None
            }
        }
    }

    fn report_failure(&mut self, what: &str, err: &EngineError) {
        tracing::warn!(%err, "{what} failed");
        self.error(format!("{what} failed: {err}"));
    }

    /// Log a warning to the console, e.g. a failure outside the engine.
    pub fn warn(&mut self, text: impl Into<String>) {
        let line = self.console.warn(text).to_string();
        self.append(line);
    }

    fn info(&mut self, text: impl Into<String>) {
        let line = self.console.info(text).to_string();
        self.append(line);
    }

    fn error(&mut self, text: impl Into<String>) {
        let line = self.console.error(text).to_string();
        self.append(line);
    }

    fn append(&mut self, line: String) {
        self.bus.publish(&Surface::Console, &Notification::Append(line));
    }

    fn require_process(&self, event: &str) -> bool {
        if self.state.process.is_none() {
            tracing::debug!(event, "no process mirrored; ignored");
            return false;
        }
        true
    }

    fn require_target(&self) -> Result<(), SessionError> {
        match self.state.target {
            Some(_) => Ok(()),
            None => Err(SessionError::NoTarget),
        }
    }

    fn stopped_thread(&self) -> Result<ThreadId, SessionError> {
        if self.state.phase != Phase::Stopped {
            return Err(SessionError::NotStopped);
        }
        self.state
            .current_thread()
            .map(|t| t.id)
            .ok_or(SessionError::NoThreadSelected)
    }

    fn show(&mut self, surface: Surface) {
        self.bus.publish(&surface, &Notification::Show);
    }

    fn hide(&mut self, surface: Surface) {
        self.bus.publish(&surface, &Notification::Hide);
    }

    fn set_contents(&mut self, dock: DockKind, text: String) {
        self.bus
            .publish(&Surface::Dock(dock), &Notification::SetContents(text));
    }

    fn hide_process_surfaces(&mut self) {
        for dock in DockKind::PROCESS {
            self.hide(Surface::Dock(dock));
        }
        self.hide(Surface::Toolbar(ToolbarKind::Process));
        self.hide(Surface::Toolbar(ToolbarKind::CurrentThread));
    }

    fn clear_markers(&mut self, file: &Path, kinds: &[MarkerKind]) {
        let editor = Surface::Editor(file.to_path_buf());
        for kind in kinds {
            self.bus.publish(&editor, &Notification::ClearMarkers(*kind));
        }
    }

    fn apply_markers(&mut self, file: &Path, kind: MarkerKind, markers: &MarkerSet) {
        let editor = Surface::Editor(file.to_path_buf());
        self.bus.publish(&editor, &Notification::ClearMarkers(kind));
        for line in derive::lines_in(markers, file) {
            self.bus
                .publish(&editor, &Notification::AddMarker { kind, line });
        }
    }

    fn apply_highlights(&mut self, file: &Path, markers: &HighlightMarkers) {
        self.apply_markers(file, MarkerKind::CurrentLine, &markers.current);
        self.apply_markers(file, MarkerKind::ActiveLine, &markers.active);
    }

    fn publish_highlights(&mut self, snapshot: &SessionState) {
        let markers = derive::highlight_markers(snapshot);
        for editor in &snapshot.open_editors {
            self.apply_highlights(editor, &markers);
        }
    }

    fn publish_breakpoint_markers(&mut self, snapshot: &SessionState) {
        let markers = derive::breakpoint_markers(snapshot);
        for editor in &snapshot.open_editors {
            self.apply_markers(editor, MarkerKind::Breakpoint, &markers);
        }
    }

    fn publish_stop_views(&mut self, snapshot: &SessionState) {
        self.set_contents(DockKind::Threads, format::thread_list(&snapshot.threads));
        let stack = snapshot
            .current_thread()
            .map(format::call_stack)
            .unwrap_or_default();
        self.set_contents(DockKind::CallStack, stack);
        self.set_contents(DockKind::Values, format::values(&snapshot.values));
    }
}

fn fetch_breakpoints<E: DebugEngine>(engine: &E) -> Result<Vec<BreakpointMirror>, EngineError> {
    let mut out = Vec::new();
    for breakpoint in &engine.breakpoints() {
        let breakpoint = breakpoint?;
        let locations = engine.locations(breakpoint.id).try_collect()?;
        out.push(BreakpointMirror {
            id: breakpoint.id,
            enabled: breakpoint.enabled,
            locations,
        });
    }
    Ok(out)
}

fn fetch_stop_data<E: DebugEngine>(engine: &E) -> Result<StopData, EngineError> {
    let mut threads = Vec::new();
    for thread in &engine.threads() {
        let thread = thread?;
        let frames = engine.frames(thread.id).try_collect()?;
        let selected_frame = selected_frame(engine, thread.id, frames.len())?;
        threads.push(ThreadMirror {
            id: thread.id,
            name: thread.name,
            is_current: thread.is_current,
            frames,
            selected_frame,
        });
    }

    let values = match threads
        .iter()
        .find(|t| t.is_current)
        .and_then(|t| Some((t.id, t.selected_frame?)))
        .and_then(|(id, frame)| engine.locals(id, frame))
    {
        Some(root) => engine.children(root).try_collect()?,
        None => Vec::new(),
    };
    Ok(StopData { threads, values })
}

/// The engine's selected frame for `thread`, or `None` when the selection
/// no longer points at a frame.
fn selected_frame<E: DebugEngine>(
    engine: &E,
    thread: ThreadId,
    frame_count: usize,
) -> Result<Option<usize>, EngineError> {
    let err = match engine.selected_frame_index(thread) {
        Ok(index) if index < frame_count => return Ok(Some(index)),
        Ok(index) => EngineError::InconsistentSelection {
            what: format!("frame {index} of thread {thread} ({frame_count} frames)"),
        },
        Err(err @ (EngineError::OutOfRange { .. } | EngineError::InconsistentSelection { .. })) => {
            err
        }
        Err(err) => return Err(err),
    };
    tracing::debug!(%err, "treating selected frame as unselected");
    Ok(None)
}

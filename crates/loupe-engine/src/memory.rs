//! A scripted, in-process [`DebugEngine`].
//!
//! `InMemoryEngine` behaves like a real engine from the front-end's point of
//! view: commands validate process state, mutate the engine-owned
//! collections and post [`EngineEvent`]s. Scripting methods (`stop_at`,
//! `exit_process`, `set_threads`, ...) stand in for the debuggee doing
//! things on its own.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::engine::DebugEngine;
use crate::error::EngineError;
use crate::event::{EngineEvent, EventSender};
use crate::model::{
    Breakpoint, BreakpointId, Frame, Location, Module, ProcessState, Thread, ThreadId, Value,
    ValueId,
};

/// A thread as scripted into the in-memory engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedThread {
    /// Thread id.
    pub id: ThreadId,
    /// Display name.
    pub name: String,
    /// Frames, innermost first.
    pub frames: Vec<Frame>,
    /// Index of the selected frame.
    pub selected_frame: usize,
}

impl ScriptedThread {
    /// A thread whose selected frame is the innermost one.
    pub fn new(id: u64, name: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            id: ThreadId(id),
            name: name.into(),
            frames,
            selected_frame: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct BreakpointEntry {
    id: BreakpointId,
    enabled: bool,
    locations: Vec<Location>,
}

#[derive(Debug, Clone)]
struct ProcessEntry {
    pid: u32,
    state: ProcessState,
    threads: Vec<ScriptedThread>,
    current: Option<ThreadId>,
}

impl ProcessEntry {
    fn new(pid: u32) -> Self {
        Self {
            pid,
            state: ProcessState::Running,
            threads: vec![ScriptedThread::new(1, "main", Vec::new())],
            current: Some(ThreadId(1)),
        }
    }

    fn thread(&self, id: ThreadId) -> Option<&ScriptedThread> {
        self.threads.iter().find(|t| t.id == id)
    }
}

/// In-process engine used by tests and the headless driver.
#[derive(Debug)]
pub struct InMemoryEngine {
    events: EventSender,
    target: Option<PathBuf>,
    modules: Vec<Module>,
    breakpoints: Vec<BreakpointEntry>,
    next_breakpoint: u32,
    process: Option<ProcessEntry>,
    next_pid: u32,
    remote: Option<String>,
    locals: HashMap<(ThreadId, usize), ValueId>,
    values: HashMap<ValueId, Vec<Value>>,
    rejections: HashMap<String, String>,
    phantom_threads: usize,
    phantom_breakpoints: usize,
}

impl InMemoryEngine {
    /// Create an engine that posts its events to `events`.
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            target: None,
            modules: Vec::new(),
            breakpoints: Vec::new(),
            next_breakpoint: 1,
            process: None,
            next_pid: 1000,
            remote: None,
            locals: HashMap::new(),
            values: HashMap::new(),
            rejections: HashMap::new(),
            phantom_threads: 0,
            phantom_breakpoints: 0,
        }
    }

    // -- scripting -------------------------------------------------------

    /// Make the next `command` fail with `message`.
    pub fn reject_next(&mut self, command: &str, message: impl Into<String>) {
        self.rejections.insert(command.to_string(), message.into());
    }

    /// Replace the module list of the current target.
    pub fn set_modules(&mut self, modules: Vec<Module>) {
        self.modules = modules;
    }

    /// Replace the process's threads and current thread. No event is posted.
    pub fn set_threads(&mut self, threads: Vec<ScriptedThread>, current: Option<u64>) {
        if let Some(process) = self.process.as_mut() {
            process.threads = threads;
            process.current = current.map(ThreadId);
        }
    }

    /// Report `extra` more threads than actually exist, so enumeration
    /// past the real ones fails.
    pub fn set_phantom_threads(&mut self, extra: usize) {
        self.phantom_threads = extra;
    }

    /// Report `extra` more breakpoints than actually exist, so breakpoint
    /// enumeration past the real ones fails.
    pub fn set_phantom_breakpoints(&mut self, extra: usize) {
        self.phantom_breakpoints = extra;
    }

    /// Add a breakpoint resolving to several locations at once.
    pub fn add_breakpoint_with_locations(
        &mut self,
        locations: Vec<Location>,
    ) -> Result<BreakpointId, EngineError> {
        let target = self.target.clone().ok_or(EngineError::NoTarget)?;
        let id = BreakpointId(self.next_breakpoint);
        self.next_breakpoint += 1;
        self.breakpoints.push(BreakpointEntry {
            id,
            enabled: true,
            locations,
        });
        self.events
            .post(EngineEvent::BreakpointsChanged { target });
        Ok(id)
    }

    /// Register `children` as the children of `value`.
    pub fn set_children(&mut self, value: ValueId, children: Vec<Value>) {
        self.values.insert(value, children);
    }

    /// Make `value` the locals root of frame `frame` on `thread`.
    pub fn set_locals(&mut self, thread: u64, frame: usize, value: ValueId) {
        self.locals.insert((ThreadId(thread), frame), value);
    }

    /// Stop the running process with the given threads.
    pub fn stop_at(
        &mut self,
        threads: Vec<ScriptedThread>,
        current: Option<u64>,
    ) -> Result<(), EngineError> {
        let process = self.process.as_mut().ok_or(EngineError::NoProcess)?;
        process.threads = threads;
        process.current = current.map(ThreadId);
        process.state = ProcessState::Stopped;
        self.events.post(EngineEvent::Ready);
        Ok(())
    }

    /// Terminate the process with `status`.
    pub fn exit_process(
        &mut self,
        status: i32,
        description: Option<&str>,
    ) -> Result<(), EngineError> {
        let process = self.process.as_ref().ok_or(EngineError::NoProcess)?;
        tracing::debug!(pid = process.pid, status, "scripted process exits");
        self.events.post(EngineEvent::Exited {
            status,
            description: description.map(str::to_string),
        });
        self.process = None;
        self.events.post(EngineEvent::ProcessEnd);
        Ok(())
    }

    /// Pid of the live process, if any.
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(|p| p.pid)
    }

    /// The remote URI passed to the last successful `connect`.
    pub fn remote(&self) -> Option<&str> {
        self.remote.as_deref()
    }

    // -- helpers ---------------------------------------------------------

    fn check_rejection(&mut self, command: &str) -> Result<(), EngineError> {
        match self.rejections.remove(command) {
            Some(message) => Err(EngineError::call_failed(command, message)),
            None => Ok(()),
        }
    }

    fn process(&self) -> Result<&ProcessEntry, EngineError> {
        self.process.as_ref().ok_or(EngineError::NoProcess)
    }

    fn require_state(&self, operation: &str, wanted: ProcessState) -> Result<(), EngineError> {
        let state = self.process()?.state;
        if state != wanted {
            return Err(EngineError::InvalidState {
                operation: operation.to_string(),
                state: state.to_string(),
            });
        }
        Ok(())
    }

    fn begin_process(&mut self, pid: u32) {
        tracing::debug!(pid, "scripted process begins");
        self.process = Some(ProcessEntry::new(pid));
        self.events.post(EngineEvent::ProcessBegin { pid });
        self.events.post(EngineEvent::Running);
    }

    fn thread(&self, id: ThreadId) -> Result<&ScriptedThread, EngineError> {
        self.process()?
            .thread(id)
            .ok_or_else(|| EngineError::call_failed("thread", format!("no thread {id}")))
    }

    fn step(&mut self, command: &str, thread: ThreadId) -> Result<(), EngineError> {
        self.check_rejection(command)?;
        self.require_state(command, ProcessState::Stopped)?;
        self.thread(thread)?;
        self.events.post(EngineEvent::Running);
        self.events.post(EngineEvent::Ready);
        Ok(())
    }

    fn breakpoint(&self, id: BreakpointId) -> Result<&BreakpointEntry, EngineError> {
        self.breakpoints
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| EngineError::call_failed("breakpoint", format!("no breakpoint {id}")))
    }
}

impl DebugEngine for InMemoryEngine {
    fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        self.check_rejection("load")?;
        tracing::debug!(path = %path.display(), "loading target");
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.target = Some(path.to_path_buf());
        self.modules = vec![Module {
            name,
            path: path.to_path_buf(),
        }];
        self.breakpoints.clear();
        self.process = None;
        self.events.post(EngineEvent::TargetChanged {
            path: Some(path.to_path_buf()),
        });
        Ok(())
    }

    fn target_path(&self) -> Option<PathBuf> {
        self.target.clone()
    }

    fn module_count(&self) -> usize {
        self.modules.len()
    }

    fn module_at(&self, index: usize) -> Result<Module, EngineError> {
        self.modules.get(index).cloned().ok_or(EngineError::OutOfRange {
            index,
            len: self.modules.len(),
        })
    }

    fn breakpoint_count(&self) -> usize {
        self.breakpoints.len() + self.phantom_breakpoints
    }

    fn breakpoint_at(&self, index: usize) -> Result<Breakpoint, EngineError> {
        self.breakpoints
            .get(index)
            .map(|b| Breakpoint {
                id: b.id,
                enabled: b.enabled,
            })
            .ok_or(EngineError::OutOfRange {
                index,
                len: self.breakpoints.len(),
            })
    }

    fn location_count(&self, id: BreakpointId) -> usize {
        self.breakpoint(id).map_or(0, |b| b.locations.len())
    }

    fn location_at(&self, id: BreakpointId, index: usize) -> Result<Location, EngineError> {
        let entry = self.breakpoint(id)?;
        entry
            .locations
            .get(index)
            .cloned()
            .ok_or(EngineError::OutOfRange {
                index,
                len: entry.locations.len(),
            })
    }

    fn add_breakpoint(&mut self, file: &Path, line: u32) -> Result<BreakpointId, EngineError> {
        self.check_rejection("add_breakpoint")?;
        self.add_breakpoint_with_locations(vec![Location::new(file, line)])
    }

    fn remove_breakpoint(&mut self, id: BreakpointId) -> Result<(), EngineError> {
        self.check_rejection("remove_breakpoint")?;
        let target = self.target.clone().ok_or(EngineError::NoTarget)?;
        let before = self.breakpoints.len();
        self.breakpoints.retain(|b| b.id != id);
        if self.breakpoints.len() == before {
            return Err(EngineError::call_failed(
                "remove_breakpoint",
                format!("no breakpoint {id}"),
            ));
        }
        self.events
            .post(EngineEvent::BreakpointsChanged { target });
        Ok(())
    }

    fn launch(&mut self) -> Result<(), EngineError> {
        self.check_rejection("launch")?;
        if self.target.is_none() {
            return Err(EngineError::NoTarget);
        }
        if let Some(process) = &self.process {
            return Err(EngineError::InvalidState {
                operation: "launch".into(),
                state: process.state.to_string(),
            });
        }
        let pid = self.next_pid;
        self.next_pid += 1;
        self.begin_process(pid);
        Ok(())
    }

    fn attach(&mut self, pid: u32) -> Result<(), EngineError> {
        self.check_rejection("attach")?;
        if self.target.is_none() {
            return Err(EngineError::NoTarget);
        }
        if self.process.is_some() {
            return Err(EngineError::call_failed("attach", "already debugging a process"));
        }
        self.begin_process(pid);
        Ok(())
    }

    fn connect(&mut self, uri: &str) -> Result<(), EngineError> {
        self.check_rejection("connect")?;
        if uri.is_empty() {
            return Err(EngineError::call_failed("connect", "empty uri"));
        }
        self.remote = Some(uri.to_string());
        Ok(())
    }

    fn process_state(&self) -> ProcessState {
        self.process
            .as_ref()
            .map_or(ProcessState::Unloaded, |p| p.state)
    }

    fn kill(&mut self) -> Result<(), EngineError> {
        self.check_rejection("kill")?;
        self.process()?;
        self.exit_process(9, Some("killed"))
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.check_rejection("pause")?;
        self.require_state("pause", ProcessState::Running)?;
        if let Some(process) = self.process.as_mut() {
            process.state = ProcessState::Stopped;
        }
        self.events.post(EngineEvent::Ready);
        Ok(())
    }

    fn continue_execution(&mut self) -> Result<(), EngineError> {
        self.check_rejection("continue")?;
        self.require_state("continue", ProcessState::Stopped)?;
        if let Some(process) = self.process.as_mut() {
            process.state = ProcessState::Running;
        }
        self.events.post(EngineEvent::Running);
        Ok(())
    }

    fn thread_count(&self) -> usize {
        self.process
            .as_ref()
            .map_or(0, |p| p.threads.len() + self.phantom_threads)
    }

    fn thread_at(&self, index: usize) -> Result<Thread, EngineError> {
        let process = self.process()?;
        let thread = process.threads.get(index).ok_or(EngineError::OutOfRange {
            index,
            len: process.threads.len(),
        })?;
        Ok(Thread {
            id: thread.id,
            name: thread.name.clone(),
            is_current: process.current == Some(thread.id),
        })
    }

    fn select_thread(&mut self, id: ThreadId) -> Result<(), EngineError> {
        self.check_rejection("select_thread")?;
        self.thread(id)?;
        if let Some(process) = self.process.as_mut() {
            process.current = Some(id);
        }
        Ok(())
    }

    fn frame_count(&self, thread: ThreadId) -> usize {
        self.thread(thread).map_or(0, |t| t.frames.len())
    }

    fn frame_at(&self, thread: ThreadId, index: usize) -> Result<Frame, EngineError> {
        let thread = self.thread(thread)?;
        thread.frames.get(index).cloned().ok_or(EngineError::OutOfRange {
            index,
            len: thread.frames.len(),
        })
    }

    fn selected_frame_index(&self, thread: ThreadId) -> Result<usize, EngineError> {
        Ok(self.thread(thread)?.selected_frame)
    }

    fn select_frame(&mut self, thread: ThreadId, index: usize) -> Result<(), EngineError> {
        self.check_rejection("select_frame")?;
        let len = self.frame_count(thread);
        if index >= len {
            return Err(EngineError::OutOfRange { index, len });
        }
        if let Some(entry) = self
            .process
            .as_mut()
            .and_then(|p| p.threads.iter_mut().find(|t| t.id == thread))
        {
            entry.selected_frame = index;
        }
        Ok(())
    }

    fn step_into(&mut self, thread: ThreadId) -> Result<(), EngineError> {
        self.step("step_into", thread)
    }

    fn step_over(&mut self, thread: ThreadId) -> Result<(), EngineError> {
        self.step("step_over", thread)
    }

    fn step_out(&mut self, thread: ThreadId) -> Result<(), EngineError> {
        self.step("step_out", thread)
    }

    fn locals(&self, thread: ThreadId, frame: usize) -> Option<ValueId> {
        self.locals.get(&(thread, frame)).copied()
    }

    fn child_count(&self, value: ValueId) -> usize {
        self.values.get(&value).map_or(0, Vec::len)
    }

    fn child_at(&self, value: ValueId, index: usize) -> Result<Value, EngineError> {
        let children = self.values.get(&value).map_or(&[][..], Vec::as_slice);
        children.get(index).cloned().ok_or(EngineError::OutOfRange {
            index,
            len: children.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{event_channel, EventReceiver};

    fn new_engine() -> (InMemoryEngine, EventReceiver) {
        let (tx, rx) = event_channel();
        (InMemoryEngine::new(tx), rx)
    }

    fn drain(rx: &mut EventReceiver) -> Vec<EngineEvent> {
        std::iter::from_fn(|| rx.try_next()).collect()
    }

    fn loaded() -> (InMemoryEngine, EventReceiver) {
        let (mut engine, mut rx) = new_engine();
        engine.load(Path::new("/bin/app")).unwrap();
        drain(&mut rx);
        (engine, rx)
    }

    #[test]
    fn load_posts_target_changed_and_lists_module() {
        let (mut engine, mut rx) = new_engine();
        engine.load(Path::new("/bin/app")).unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![EngineEvent::TargetChanged {
                path: Some(PathBuf::from("/bin/app"))
            }]
        );
        let modules = engine.modules().try_collect().unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "app");
    }

    #[test]
    fn launch_without_target_fails() {
        let (mut engine, _rx) = new_engine();
        assert_eq!(engine.launch().unwrap_err(), EngineError::NoTarget);
    }

    #[test]
    fn launch_posts_begin_then_running() {
        let (mut engine, mut rx) = loaded();
        engine.launch().unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![EngineEvent::ProcessBegin { pid: 1000 }, EngineEvent::Running]
        );
        assert_eq!(engine.process_state(), ProcessState::Running);
    }

    #[test]
    fn rejected_command_fails_once() {
        let (mut engine, mut rx) = loaded();
        engine.reject_next("launch", "missing binary");
        let err = engine.launch().unwrap_err();
        assert_eq!(err, EngineError::call_failed("launch", "missing binary"));
        assert!(drain(&mut rx).is_empty());
        engine.launch().unwrap();
    }

    #[test]
    fn breakpoint_add_remove_posts_changes() {
        let (mut engine, mut rx) = loaded();
        let id = engine.add_breakpoint(Path::new("main.c"), 10).unwrap();
        assert_eq!(engine.breakpoints().len(), 1);
        assert_eq!(
            engine.find_breakpoint(Path::new("main.c"), 10).unwrap(),
            Some(id)
        );
        engine.remove_breakpoint(id).unwrap();
        assert!(engine.breakpoints().is_empty());
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| matches!(e, EngineEvent::BreakpointsChanged { .. })));
    }

    #[test]
    fn removing_unknown_breakpoint_fails() {
        let (mut engine, _rx) = loaded();
        let err = engine.remove_breakpoint(BreakpointId(99)).unwrap_err();
        assert!(matches!(err, EngineError::CallFailed { .. }));
    }

    #[test]
    fn stop_continue_cycle() {
        let (mut engine, mut rx) = loaded();
        engine.launch().unwrap();
        engine
            .stop_at(
                vec![ScriptedThread::new(
                    1,
                    "main",
                    vec![Frame::at("main", "main.c", 15)],
                )],
                Some(1),
            )
            .unwrap();
        assert_eq!(engine.process_state(), ProcessState::Stopped);
        engine.continue_execution().unwrap();
        assert_eq!(engine.process_state(), ProcessState::Running);
        let events = drain(&mut rx);
        assert_eq!(events.last(), Some(&EngineEvent::Running));
    }

    #[test]
    fn continue_while_running_is_invalid() {
        let (mut engine, _rx) = loaded();
        engine.launch().unwrap();
        assert!(matches!(
            engine.continue_execution(),
            Err(EngineError::InvalidState { .. })
        ));
    }

    #[test]
    fn threads_report_current_flag() {
        let (mut engine, _rx) = loaded();
        engine.launch().unwrap();
        engine
            .stop_at(
                vec![
                    ScriptedThread::new(1, "main", vec![]),
                    ScriptedThread::new(2, "worker", vec![]),
                ],
                Some(2),
            )
            .unwrap();
        let threads = engine.threads().try_collect().unwrap();
        assert!(!threads[0].is_current);
        assert!(threads[1].is_current);
        engine.select_thread(ThreadId(1)).unwrap();
        assert!(engine.threads().at(0).unwrap().is_current);
    }

    #[test]
    fn phantom_threads_fail_enumeration() {
        let (mut engine, _rx) = loaded();
        engine.launch().unwrap();
        engine.set_phantom_threads(1);
        assert_eq!(engine.threads().len(), 2);
        assert!(engine.threads().try_collect().unwrap_err().is_out_of_range());
    }

    #[test]
    fn phantom_breakpoints_fail_enumeration() {
        let (mut engine, _rx) = loaded();
        engine.add_breakpoint(Path::new("main.c"), 10).unwrap();
        engine.set_phantom_breakpoints(1);
        assert_eq!(engine.breakpoints().len(), 2);
        assert!(engine.breakpoints().try_collect().unwrap_err().is_out_of_range());
    }

    #[test]
    fn exit_posts_exited_then_process_end() {
        let (mut engine, mut rx) = loaded();
        engine.launch().unwrap();
        drain(&mut rx);
        engine.exit_process(1, Some("Segmentation fault")).unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![
                EngineEvent::Exited {
                    status: 1,
                    description: Some("Segmentation fault".into())
                },
                EngineEvent::ProcessEnd
            ]
        );
        assert_eq!(engine.process_state(), ProcessState::Unloaded);
    }

    #[test]
    fn select_frame_out_of_range_fails() {
        let (mut engine, _rx) = loaded();
        engine.launch().unwrap();
        engine
            .stop_at(
                vec![ScriptedThread::new(1, "main", vec![Frame::opaque("start")])],
                Some(1),
            )
            .unwrap();
        assert!(engine.select_frame(ThreadId(1), 3).unwrap_err().is_out_of_range());
        engine.select_frame(ThreadId(1), 0).unwrap();
    }

    #[test]
    fn children_enumerate_registered_values() {
        let (mut engine, _rx) = new_engine();
        let root = ValueId(1);
        engine.set_children(
            root,
            vec![Value {
                id: ValueId(2),
                name: "argc".into(),
                type_name: "int".into(),
                summary: "1".into(),
            }],
        );
        let children = engine.children(root).try_collect().unwrap();
        assert_eq!(children[0].name, "argc");
        assert!(engine.children(ValueId(9)).is_empty());
    }

    #[test]
    fn connect_records_remote() {
        let (mut engine, _rx) = new_engine();
        engine.connect("connect://localhost:1234").unwrap();
        assert_eq!(engine.remote(), Some("connect://localhost:1234"));
        assert!(engine.connect("").is_err());
    }
}

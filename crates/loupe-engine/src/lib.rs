//! loupe-engine: the native debugging engine as seen by the front-end.
//!
//! This crate defines the [`DebugEngine`] trait the synchronization layer
//! drives, the value types the engine hands out, the asynchronous
//! [`EngineEvent`] stream, and the [`IndexedSequence`] adapter through which
//! every engine-owned collection is enumerated.

pub mod engine;
pub mod error;
pub mod event;
pub mod memory;
pub mod model;
pub mod sequence;

// Re-export key types for convenience.
pub use engine::DebugEngine;
pub use error::EngineError;
pub use event::{event_channel, EngineEvent, EventReceiver, EventSender};
pub use memory::{InMemoryEngine, ScriptedThread};
pub use model::{
    Breakpoint, BreakpointId, Frame, Location, Module, ProcessState, Thread, ThreadId, Value,
    ValueId,
};
pub use sequence::IndexedSequence;

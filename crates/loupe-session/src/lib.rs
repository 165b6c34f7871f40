//! loupe-session: keeps every debugger view consistent with the engine.
//!
//! The [`Synchronizer`] consumes [`EngineEvent`](loupe_engine::EngineEvent)s,
//! updates the single-writer [`SessionState`], derives markers and dock
//! contents from an immutable snapshot of it, and publishes the result on
//! the [`NotificationBus`]. [`Bootstrap`] wires in project persistence and the
//! recent-targets list.

pub mod bootstrap;
pub mod bus;
pub mod derive;
pub mod error;
pub mod format;
pub mod project;
pub mod recents;
pub mod state;
pub mod sync;
pub mod views;

pub use bootstrap::Bootstrap;
pub use bus::{
    ActionKind, DockKind, MarkerKind, Notification, NotificationBus, SubscriptionId, Surface,
    ToolbarKind, Topic,
};
pub use error::SessionError;
pub use project::{Geometry, JsonProjectStore, MemoryProjectStore, ProjectState, ProjectStore};
pub use recents::{MenuEntry, RecentTargets};
pub use state::{
    BreakpointMirror, ExitInfo, Phase, ProcessMirror, SessionState, TargetMirror, ThreadMirror,
};
pub use sync::Synchronizer;
pub use views::ViewMirror;

//! Asynchronous notifications emitted by the engine.
//!
//! The engine may post from any thread; the front-end drains the queue on
//! its single control thread, one event at a time.

use std::path::PathBuf;

use tokio::sync::mpsc;

/// A notification from the native engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The current target changed. `None` means the target was unloaded.
    TargetChanged {
        /// Path of the new target.
        path: Option<PathBuf>,
    },
    /// A process was launched or attached.
    ProcessBegin {
        /// Operating-system process id.
        pid: u32,
    },
    /// The process object went away.
    ProcessEnd,
    /// The process started or resumed running.
    Running,
    /// The process stopped and can be examined.
    Ready,
    /// The process exited.
    Exited {
        /// Exit status code.
        status: i32,
        /// Optional human-readable reason (e.g. a signal name).
        description: Option<String>,
    },
    /// The breakpoint set of `target` changed.
    BreakpointsChanged {
        /// Target whose breakpoints changed.
        target: PathBuf,
    },
}

impl EngineEvent {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TargetChanged { .. } => "target-changed",
            Self::ProcessBegin { .. } => "process-begin",
            Self::ProcessEnd => "process-end",
            Self::Running => "running",
            Self::Ready => "ready",
            Self::Exited { .. } => "exited",
            Self::BreakpointsChanged { .. } => "breakpoints-changed",
        }
    }
}

/// Posting half of the event queue. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EventSender {
    /// Post an event. Events posted after the receiver is gone are dropped.
    pub fn post(&self, event: EngineEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event receiver dropped; discarding engine event");
        }
    }
}

/// Draining half of the event queue, owned by the control thread.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<EngineEvent>,
}

impl EventReceiver {
    /// Take the next queued event without blocking.
    pub fn try_next(&mut self) -> Option<EngineEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next event. Returns `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<EngineEvent> {
        self.rx.recv().await
    }
}

/// Create a connected sender/receiver pair.
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_delivered_in_post_order() {
        let (tx, mut rx) = event_channel();
        tx.post(EngineEvent::Running);
        tx.post(EngineEvent::Ready);
        assert_eq!(rx.try_next(), Some(EngineEvent::Running));
        assert_eq!(rx.try_next(), Some(EngineEvent::Ready));
        assert_eq!(rx.try_next(), None);
    }

    #[test]
    fn post_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = event_channel();
        drop(rx);
        tx.post(EngineEvent::ProcessEnd);
    }

    #[test]
    fn sender_can_post_from_another_thread() {
        let (tx, mut rx) = event_channel();
        let remote = tx.clone();
        std::thread::spawn(move || remote.post(EngineEvent::ProcessBegin { pid: 42 }))
            .join()
            .unwrap();
        assert_eq!(rx.try_next(), Some(EngineEvent::ProcessBegin { pid: 42 }));
    }

    #[test]
    fn event_names() {
        assert_eq!(EngineEvent::Ready.name(), "ready");
        assert_eq!(
            EngineEvent::Exited {
                status: 0,
                description: None
            }
            .name(),
            "exited"
        );
    }

    #[tokio::test]
    async fn next_waits_for_posted_event() {
        let (tx, mut rx) = event_channel();
        tx.post(EngineEvent::Running);
        assert_eq!(rx.next().await, Some(EngineEvent::Running));
        drop(tx);
        assert_eq!(rx.next().await, None);
    }
}

//! Typed publish/subscribe between the synchronizer and the views.

use std::fmt;
use std::path::PathBuf;

/// Docks that mirror engine collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DockKind {
    Threads,
    CallStack,
    Values,
    Modules,
    Breakpoints,
}

impl DockKind {
    /// Docks that only make sense while a process exists.
    pub const PROCESS: [DockKind; 3] = [DockKind::Threads, DockKind::CallStack, DockKind::Values];
}

/// Toolbars whose visibility follows the session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ToolbarKind {
    /// Launch, attach, connect.
    Target,
    /// Kill, pause/continue.
    Process,
    /// Step into / over / out.
    CurrentThread,
}

/// Individual actions whose label changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    /// Reads "Pause" while running and "Continue" while stopped.
    PauseContinue,
}

/// Something a view renders.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Surface {
    Dock(DockKind),
    Toolbar(ToolbarKind),
    Action(ActionKind),
    /// The source editor showing this file.
    Editor(PathBuf),
    Window,
    Console,
}

impl Surface {
    /// Whether this is a source editor.
    pub fn is_editor(&self) -> bool {
        matches!(self, Surface::Editor(_))
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Surface::Dock(kind) => write!(f, "dock:{kind:?}"),
            Surface::Toolbar(kind) => write!(f, "toolbar:{kind:?}"),
            Surface::Action(kind) => write!(f, "action:{kind:?}"),
            Surface::Editor(path) => write!(f, "editor:{}", path.display()),
            Surface::Window => f.write_str("window"),
            Surface::Console => f.write_str("console"),
        }
    }
}

/// Editor line decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerKind {
    /// The current thread's selected frame.
    CurrentLine,
    /// Another thread's selected frame.
    ActiveLine,
    /// A breakpoint location.
    Breakpoint,
}

impl MarkerKind {
    /// The kinds derived from thread state.
    pub const HIGHLIGHTS: [MarkerKind; 2] = [MarkerKind::CurrentLine, MarkerKind::ActiveLine];
}

/// What a surface should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Show,
    Hide,
    /// Replace the surface's text (dock contents, action label, window
    /// geometry).
    SetContents(String),
    AddMarker { kind: MarkerKind, line: u32 },
    ClearMarkers(MarkerKind),
    /// Scroll to and place the cursor on `line`.
    Focus { line: u32 },
    /// Append one console line.
    Append(String),
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Show => f.write_str("show"),
            Notification::Hide => f.write_str("hide"),
            Notification::SetContents(text) => write!(f, "set {} line(s)", text.lines().count()),
            Notification::AddMarker { kind, line } => write!(f, "add {kind:?} @{line}"),
            Notification::ClearMarkers(kind) => write!(f, "clear {kind:?}"),
            Notification::Focus { line } => write!(f, "focus @{line}"),
            Notification::Append(text) => write!(f, "append {text}"),
        }
    }
}

/// Which notifications a subscriber receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    /// Exactly one surface.
    Surface(Surface),
    /// Every source editor.
    Editors,
    /// Everything.
    Any,
}

impl Topic {
    /// Whether a notification for `surface` falls under this topic.
    pub fn matches(&self, surface: &Surface) -> bool {
        match self {
            Topic::Surface(s) => s == surface,
            Topic::Editors => surface.is_editor(),
            Topic::Any => true,
        }
    }
}

/// Handle returned by [`NotificationBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Surface, &Notification)>;

struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    listener: Listener,
}

/// Delivers notifications to subscribers in subscription order.
pub struct NotificationBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
    published: u64,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("subscribers", &self.subscriptions.len())
            .field("published", &self.published)
            .finish()
    }
}

impl NotificationBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 1,
            published: 0,
        }
    }

    /// Register `listener` for `topic`.
    pub fn subscribe<F>(&mut self, topic: Topic, listener: F) -> SubscriptionId
    where
        F: FnMut(&Surface, &Notification) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            topic,
            listener: Box::new(listener),
        });
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Deliver `notification` for `surface` to every matching subscriber.
    pub fn publish(&mut self, surface: &Surface, notification: &Notification) {
        self.published += 1;
        tracing::trace!(%surface, %notification, "publish");
        for sub in &mut self.subscriptions {
            if sub.topic.matches(surface) {
                (sub.listener)(surface, notification);
            }
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Notifications published so far.
    pub fn published(&self) -> u64 {
        self.published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(String, Notification)>>>;

    fn recorder(bus: &mut NotificationBus, tag: &str, topic: Topic, log: &Log) -> SubscriptionId {
        let log = Rc::clone(log);
        let tag = tag.to_string();
        bus.subscribe(topic, move |_, n| log.borrow_mut().push((tag.clone(), n.clone())))
    }

    #[test]
    fn delivery_follows_subscription_order() {
        let mut bus = NotificationBus::new();
        let log: Log = Rc::default();
        recorder(&mut bus, "b", Topic::Any, &log);
        recorder(&mut bus, "a", Topic::Any, &log);

        bus.publish(&Surface::Window, &Notification::Show);

        let tags: Vec<String> = log.borrow().iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(tags, vec!["b", "a"]);
    }

    #[test]
    fn surface_topic_filters() {
        let mut bus = NotificationBus::new();
        let log: Log = Rc::default();
        recorder(
            &mut bus,
            "threads",
            Topic::Surface(Surface::Dock(DockKind::Threads)),
            &log,
        );

        bus.publish(&Surface::Dock(DockKind::Values), &Notification::Hide);
        bus.publish(&Surface::Dock(DockKind::Threads), &Notification::Show);

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].1, Notification::Show);
    }

    #[test]
    fn editors_topic_matches_any_editor() {
        let topic = Topic::Editors;
        assert!(topic.matches(&Surface::Editor(PathBuf::from("main.c"))));
        assert!(topic.matches(&Surface::Editor(PathBuf::from("util.c"))));
        assert!(!topic.matches(&Surface::Console));
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = NotificationBus::new();
        let log: Log = Rc::default();
        let id = recorder(&mut bus, "x", Topic::Any, &log);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&Surface::Console, &Notification::Append("hi".into()));
        assert!(log.borrow().is_empty());
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.published(), 1);
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(
            Surface::Editor(PathBuf::from("main.c")).to_string(),
            "editor:main.c"
        );
        assert_eq!(
            Notification::AddMarker {
                kind: MarkerKind::CurrentLine,
                line: 15
            }
            .to_string(),
            "add CurrentLine @15"
        );
        assert_eq!(Surface::Dock(DockKind::CallStack).to_string(), "dock:CallStack");
    }
}

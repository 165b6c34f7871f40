//! A headless view that accumulates bus notifications into state.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::bus::{MarkerKind, Notification, NotificationBus, Surface, Topic};

/// What every surface would currently be showing.
#[derive(Debug, Default, Clone)]
pub struct ViewMirror {
    visible: BTreeSet<Surface>,
    contents: BTreeMap<Surface, String>,
    markers: BTreeMap<PathBuf, BTreeMap<MarkerKind, BTreeSet<u32>>>,
    focus: Option<(PathBuf, u32)>,
    console: Vec<String>,
}

impl ViewMirror {
    /// Create an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a fresh mirror to everything on `bus`.
    pub fn attach(bus: &mut NotificationBus) -> Rc<RefCell<ViewMirror>> {
        let mirror = Rc::new(RefCell::new(ViewMirror::new()));
        let sink = Rc::clone(&mirror);
        bus.subscribe(Topic::Any, move |surface, notification| {
            sink.borrow_mut().apply(surface, notification);
        });
        mirror
    }

    /// Fold one notification in.
    pub fn apply(&mut self, surface: &Surface, notification: &Notification) {
        match notification {
            Notification::Show => {
                self.visible.insert(surface.clone());
            }
            Notification::Hide => {
                self.visible.remove(surface);
            }
            Notification::SetContents(text) => {
                self.contents.insert(surface.clone(), text.clone());
            }
            Notification::AddMarker { kind, line } => {
                if let Surface::Editor(path) = surface {
                    self.markers
                        .entry(path.clone())
                        .or_default()
                        .entry(*kind)
                        .or_default()
                        .insert(*line);
                }
            }
            Notification::ClearMarkers(kind) => {
                if let Surface::Editor(path) = surface {
                    if let Some(kinds) = self.markers.get_mut(path) {
                        kinds.remove(kind);
                    }
                }
            }
            Notification::Focus { line } => {
                if let Surface::Editor(path) = surface {
                    self.focus = Some((path.clone(), *line));
                }
            }
            Notification::Append(text) => self.console.push(text.clone()),
        }
    }

    /// Whether `surface` was last shown rather than hidden.
    pub fn is_visible(&self, surface: &Surface) -> bool {
        self.visible.contains(surface)
    }

    /// Last contents set on `surface`.
    pub fn contents(&self, surface: &Surface) -> Option<&str> {
        self.contents.get(surface).map(String::as_str)
    }

    /// Marked lines of `kind` in `file`, ascending.
    pub fn markers(&self, file: &Path, kind: MarkerKind) -> Vec<u32> {
        self.markers
            .get(file)
            .and_then(|kinds| kinds.get(&kind))
            .map(|lines| lines.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Markers of `kind` across every editor.
    pub fn marker_count(&self, kind: MarkerKind) -> usize {
        self.markers
            .values()
            .filter_map(|kinds| kinds.get(&kind))
            .map(BTreeSet::len)
            .sum()
    }

    /// Last focused editor location.
    pub fn focus(&self) -> Option<(&Path, u32)> {
        self.focus.as_ref().map(|(p, l)| (p.as_path(), *l))
    }

    /// Console lines, oldest first.
    pub fn console(&self) -> &[String] {
        &self.console
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::DockKind;

    fn editor(name: &str) -> Surface {
        Surface::Editor(PathBuf::from(name))
    }

    #[test]
    fn show_hide_toggle_visibility() {
        let mut view = ViewMirror::new();
        let dock = Surface::Dock(DockKind::Threads);
        view.apply(&dock, &Notification::Show);
        assert!(view.is_visible(&dock));
        view.apply(&dock, &Notification::Hide);
        assert!(!view.is_visible(&dock));
    }

    #[test]
    fn markers_accumulate_and_clear_per_kind() {
        let mut view = ViewMirror::new();
        let main = editor("main.c");
        for line in [10, 20, 10] {
            view.apply(
                &main,
                &Notification::AddMarker {
                    kind: MarkerKind::Breakpoint,
                    line,
                },
            );
        }
        view.apply(
            &main,
            &Notification::AddMarker {
                kind: MarkerKind::CurrentLine,
                line: 15,
            },
        );
        assert_eq!(view.markers(Path::new("main.c"), MarkerKind::Breakpoint), vec![10, 20]);

        view.apply(&main, &Notification::ClearMarkers(MarkerKind::Breakpoint));
        assert!(view.markers(Path::new("main.c"), MarkerKind::Breakpoint).is_empty());
        assert_eq!(view.marker_count(MarkerKind::CurrentLine), 1);
    }

    #[test]
    fn markers_on_non_editor_surfaces_are_ignored() {
        let mut view = ViewMirror::new();
        view.apply(
            &Surface::Console,
            &Notification::AddMarker {
                kind: MarkerKind::ActiveLine,
                line: 1,
            },
        );
        assert_eq!(view.marker_count(MarkerKind::ActiveLine), 0);
    }

    #[test]
    fn attach_receives_published_notifications() {
        let mut bus = NotificationBus::new();
        let view = ViewMirror::attach(&mut bus);
        bus.publish(&Surface::Console, &Notification::Append("[INFO] hello".into()));
        bus.publish(&editor("util.c"), &Notification::Focus { line: 4 });
        assert_eq!(view.borrow().console(), ["[INFO] hello".to_string()]);
        assert_eq!(view.borrow().focus(), Some((Path::new("util.c"), 4)));
    }

    #[test]
    fn contents_are_replaced() {
        let mut view = ViewMirror::new();
        let dock = Surface::Dock(DockKind::Modules);
        view.apply(&dock, &Notification::SetContents("a".into()));
        view.apply(&dock, &Notification::SetContents("b".into()));
        assert_eq!(view.contents(&dock), Some("b"));
    }
}

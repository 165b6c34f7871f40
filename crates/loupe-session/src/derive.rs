//! Marker derivation.
//!
//! Markers are never patched. Every handler that touches threads or
//! breakpoints recomputes them from a [`SessionState`] snapshot with these
//! functions and republishes the result.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::state::SessionState;

/// Lines to mark, per source file.
pub type MarkerSet = BTreeMap<PathBuf, BTreeSet<u32>>;

/// Source-highlight markers for the stopped process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightMarkers {
    /// The current thread's selected frame (at most one entry overall).
    pub current: MarkerSet,
    /// Every other thread's selected frame.
    pub active: MarkerSet,
}

impl HighlightMarkers {
    /// Whether nothing is highlighted.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.active.is_empty()
    }
}

/// Highlight markers for the threads in `state`, restricted to open editors.
///
/// Threads whose selected frame has no line number contribute nothing.
pub fn highlight_markers(state: &SessionState) -> HighlightMarkers {
    let mut markers = HighlightMarkers::default();
    for thread in &state.threads {
        let Some((file, line)) = thread.selected().and_then(|f| f.source_location()) else {
            continue;
        };
        if !state.is_open(file) {
            continue;
        }
        let set = if thread.is_current {
            &mut markers.current
        } else {
            &mut markers.active
        };
        set.entry(file.to_path_buf()).or_default().insert(line);
    }
    markers
}

/// One marker per distinct `(file, line)` across every location of every
/// breakpoint of the current target.
pub fn breakpoint_markers(state: &SessionState) -> MarkerSet {
    let mut markers = MarkerSet::new();
    for location in state.breakpoints.iter().flat_map(|b| &b.locations) {
        markers
            .entry(location.file.clone())
            .or_default()
            .insert(location.line);
    }
    markers
}

/// Lines of `set` that belong to `file`.
pub fn lines_in<'a>(set: &'a MarkerSet, file: &Path) -> impl Iterator<Item = u32> + 'a {
    set.get(file).into_iter().flatten().copied()
}

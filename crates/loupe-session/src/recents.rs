//! Most-recently-used target list.

use std::path::{Path, PathBuf};

/// Paths longer than this are shortened in menu labels.
const MAX_LABEL_PATH_CHARS: usize = 50;

/// Bounded MRU list of target paths. Front is oldest, back is most recent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTargets {
    cap: usize,
    entries: Vec<PathBuf>,
}

/// One row of the recent-targets menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    /// `"{basename} ({path})"`.
    pub label: String,
    pub path: PathBuf,
}

impl RecentTargets {
    /// Default number of remembered targets.
    pub const DEFAULT_CAP: usize = 10;

    /// An empty list holding at most `cap` entries (at least one).
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            entries: Vec::new(),
        }
    }

    /// Rebuild from persisted entries (oldest first), dropping duplicates
    /// and anything over the cap.
    pub fn from_entries(cap: usize, entries: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut recents = Self::new(cap);
        for entry in entries {
            recents.push(entry);
        }
        recents
    }

    /// Record a successful load of `path`.
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.entries.retain(|p| *p != path);
        self.entries.push(path);
        if self.entries.len() > self.cap {
            let excess = self.entries.len() - self.cap;
            self.entries.drain(..excess);
        }
    }

    /// The most recently loaded target.
    pub fn most_recent(&self) -> Option<&Path> {
        self.entries.last().map(PathBuf::as_path)
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Menu rows, most recent first.
    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        self.entries
            .iter()
            .rev()
            .map(|path| MenuEntry {
                label: menu_label(path),
                path: path.clone(),
            })
            .collect()
    }
}

impl Default for RecentTargets {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAP)
    }
}

fn menu_label(path: &Path) -> String {
    let full = path.display().to_string();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| full.clone());
    let count = full.chars().count();
    let shown = if count > MAX_LABEL_PATH_CHARS {
        let tail: String = full.chars().skip(count - MAX_LABEL_PATH_CHARS).collect();
        format!("...{tail}")
    } else {
        full
    };
    format!("{name} ({shown})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_moves_existing_to_back() {
        let mut r = RecentTargets::new(10);
        r.push("/a");
        r.push("/b");
        r.push("/a");
        assert_eq!(r.entries(), [PathBuf::from("/b"), PathBuf::from("/a")]);
        assert_eq!(r.most_recent(), Some(Path::new("/a")));
    }

    #[test]
    fn oldest_dropped_over_cap() {
        let mut r = RecentTargets::new(3);
        for p in ["/1", "/2", "/3", "/4"] {
            r.push(p);
        }
        assert_eq!(r.len(), 3);
        assert_eq!(r.entries()[0], PathBuf::from("/2"));
        assert_eq!(r.most_recent(), Some(Path::new("/4")));
    }

    #[test]
    fn never_exceeds_cap_and_has_no_duplicates() {
        let mut r = RecentTargets::default();
        for i in 0..40 {
            r.push(format!("/bin/t{}", i % 13));
            assert!(r.len() <= r.cap());
            let mut seen = r.entries().to_vec();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), r.len());
            assert_eq!(r.most_recent(), Some(Path::new(&format!("/bin/t{}", i % 13))));
        }
    }

    #[test]
    fn zero_cap_is_raised_to_one() {
        let mut r = RecentTargets::new(0);
        r.push("/a");
        r.push("/b");
        assert_eq!(r.entries(), [PathBuf::from("/b")]);
    }

    #[test]
    fn from_entries_dedupes_and_truncates() {
        let r = RecentTargets::from_entries(
            2,
            ["/a", "/b", "/a", "/c"].into_iter().map(PathBuf::from),
        );
        assert_eq!(r.entries(), [PathBuf::from("/a"), PathBuf::from("/c")]);
    }

    #[test]
    fn menu_lists_most_recent_first() {
        let mut r = RecentTargets::default();
        r.push("/usr/bin/ls");
        r.push("/usr/bin/cat");
        let menu = r.menu_entries();
        assert_eq!(menu[0].label, "cat (/usr/bin/cat)");
        assert_eq!(menu[1].path, PathBuf::from("/usr/bin/ls"));
    }

    #[test]
    fn long_paths_are_shortened() {
        let long = format!("/home/user/{}/app", "x".repeat(60));
        let label = menu_label(Path::new(&long));
        let shown = label
            .strip_prefix("app (...")
            .and_then(|s| s.strip_suffix(')'))
            .unwrap();
        assert_eq!(shown.chars().count(), MAX_LABEL_PATH_CHARS);
        assert!(long.ends_with(shown));
    }

    #[test]
    fn fifty_char_path_is_kept_whole() {
        let path = format!("/{}", "p".repeat(49));
        assert_eq!(menu_label(Path::new(&path)), format!("{} ({path})", "p".repeat(49)));
    }
}

//! Text rendering of dock contents.

use std::fmt::Write as _;

use loupe_engine::{Frame, Module, Value};

use crate::state::{BreakpointMirror, ThreadMirror};

/// One line per thread: `0x{id} {name} {function} line {n}` from the top
/// frame, current thread prefixed with `*`.
pub fn thread_list(threads: &[ThreadMirror]) -> String {
    let mut out = String::new();
    for thread in threads {
        let mark = if thread.is_current { '*' } else { ' ' };
        let _ = write!(out, "{mark} {}", thread.id);
        if !thread.name.is_empty() {
            let _ = write!(out, " {}", thread.name);
        }
        if let Some(frame) = thread.frames.first() {
            let _ = write!(out, " {}", frame.function);
            if let Some(line) = frame.line {
                let _ = write!(out, " line {line}");
            }
        }
        out.push('\n');
    }
    out
}

/// The frames of `thread`, innermost first, selected one prefixed with `>`.
pub fn call_stack(thread: &ThreadMirror) -> String {
    let mut out = String::new();
    for (index, frame) in thread.frames.iter().enumerate() {
        let mark = if thread.selected_frame == Some(index) { '>' } else { ' ' };
        let _ = writeln!(out, "{mark} #{index} {}", frame_label(frame));
    }
    out
}

fn frame_label(frame: &Frame) -> String {
    match (&frame.file, frame.line) {
        (Some(file), Some(line)) => format!("{} at {}:{line}", frame.function, file.display()),
        (Some(file), None) => format!("{} in {}", frame.function, file.display()),
        _ => frame.function.clone(),
    }
}

/// `name: type = summary` per value.
pub fn values(values: &[Value]) -> String {
    let mut out = String::new();
    for value in values {
        let _ = writeln!(out, "{}: {} = {}", value.name, value.type_name, value.summary);
    }
    out
}

/// `#{id} {file}:{line}` per location.
pub fn breakpoints(breakpoints: &[BreakpointMirror]) -> String {
    let mut out = String::new();
    for bp in breakpoints {
        for loc in &bp.locations {
            let _ = write!(out, "{} {}:{}", bp.id, loc.file.display(), loc.line);
            if !bp.enabled {
                out.push_str(" (disabled)");
            }
            if !loc.resolved {
                out.push_str(" (unresolved)");
            }
            out.push('\n');
        }
    }
    out
}

/// `name  path` per module.
pub fn modules(modules: &[Module]) -> String {
    let mut out = String::new();
    for module in modules {
        let _ = writeln!(out, "{}  {}", module.name, module.path.display());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use loupe_engine::{BreakpointId, Location, ThreadId, ValueId};
    use std::path::PathBuf;

    fn main_thread() -> ThreadMirror {
        ThreadMirror {
            id: ThreadId(0x1a),
            name: "main".into(),
            is_current: true,
            frames: vec![Frame::at("main", "main.c", 15), Frame::opaque("_start")],
            selected_frame: Some(0),
        }
    }

    #[test]
    fn thread_rows() {
        let worker = ThreadMirror {
            id: ThreadId(2),
            name: String::new(),
            is_current: false,
            frames: vec![Frame::opaque("nanosleep")],
            selected_frame: Some(0),
        };
        assert_eq!(
            thread_list(&[main_thread(), worker]),
            "* 0x1a main main line 15\n  0x2 nanosleep\n"
        );
    }

    #[test]
    fn thread_row_shows_top_frame_not_selected_one() {
        let mut thread = main_thread();
        thread.frames.insert(0, Frame::at("leaf", "util.c", 4));
        thread.selected_frame = Some(1);
        assert_eq!(thread_list(&[thread]), "* 0x1a main leaf line 4\n");
    }

    #[test]
    fn call_stack_marks_selected_frame() {
        assert_eq!(
            call_stack(&main_thread()),
            "> #0 main at main.c:15\n  #1 _start\n"
        );
    }

    #[test]
    fn value_rows() {
        let v = Value {
            id: ValueId(1),
            name: "argc".into(),
            type_name: "int".into(),
            summary: "2".into(),
        };
        assert_eq!(values(&[v]), "argc: int = 2\n");
    }

    #[test]
    fn breakpoint_rows_list_every_location() {
        let mut unresolved = Location::new("lib.c", 7);
        unresolved.resolved = false;
        let bps = vec![
            BreakpointMirror {
                id: BreakpointId(1),
                enabled: true,
                locations: vec![Location::new("main.c", 10), Location::new("main.c", 20)],
            },
            BreakpointMirror {
                id: BreakpointId(2),
                enabled: false,
                locations: vec![unresolved],
            },
        ];
        assert_eq!(
            breakpoints(&bps),
            "#1 main.c:10\n#1 main.c:20\n#2 lib.c:7 (disabled) (unresolved)\n"
        );
    }

    #[test]
    fn module_rows() {
        let m = Module {
            name: "app".into(),
            path: PathBuf::from("/bin/app"),
        };
        assert_eq!(modules(&[m]), "app  /bin/app\n");
    }

    #[test]
    fn empty_inputs_render_empty() {
        assert!(thread_list(&[]).is_empty());
        assert!(breakpoints(&[]).is_empty());
    }
}

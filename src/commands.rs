//! Line commands understood by the headless driver.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

/// One parsed driver command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Run,
    Attach(u32),
    Connect(String),
    /// Toggle the breakpoint at a source location.
    Break { file: PathBuf, line: u32 },
    Open(PathBuf),
    Close(PathBuf),
    /// Script the debuggee to stop with one thread per location; the first
    /// is current.
    Stop(Vec<(PathBuf, u32)>),
    Pause,
    Continue,
    Thread(u64),
    Frame(usize),
    Step,
    Next,
    Finish,
    /// Script the debuggee to exit.
    Exit {
        status: i32,
        description: Option<String>,
    },
    Kill,
    Status,
    Recent,
    Help,
    Quit,
}

/// Text printed by `help`.
pub const HELP: &str = "\
load PATH            load a target
run                  launch the target
attach PID           attach to a process
connect URI          connect to remote debug services
break FILE:LINE      toggle a breakpoint
open FILE / close FILE
stop FILE:LINE...    make the debuggee stop (first location is current)
pause / continue
thread ID            select a thread (decimal or 0x hex)
frame N              select a frame of the current thread
step / next / finish step into / over / out
exit CODE [REASON]   make the debuggee exit
kill
status / recent / help / quit";

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let cmd = match word {
        "load" => Command::Load(path_arg(rest, word)?),
        "run" | "r" => Command::Run,
        "attach" => Command::Attach(
            rest.parse()
                .with_context(|| format!("attach: bad pid `{rest}`"))?,
        ),
        "connect" => {
            if rest.is_empty() {
                bail!("connect: missing URI");
            }
            Command::Connect(rest.to_string())
        }
        "break" | "b" => {
            let (file, line) = location(rest)?;
            Command::Break { file, line }
        }
        "open" => Command::Open(path_arg(rest, word)?),
        "close" => Command::Close(path_arg(rest, word)?),
        "stop" => {
            let locations = rest
                .split_whitespace()
                .map(location)
                .collect::<Result<Vec<_>>>()?;
            if locations.is_empty() {
                bail!("stop: expected at least one FILE:LINE");
            }
            Command::Stop(locations)
        }
        "pause" => Command::Pause,
        "continue" | "c" => Command::Continue,
        "thread" => Command::Thread(thread_id(rest)?),
        "frame" | "f" => Command::Frame(
            rest.parse()
                .with_context(|| format!("frame: bad index `{rest}`"))?,
        ),
        "step" | "s" => Command::Step,
        "next" | "n" => Command::Next,
        "finish" => Command::Finish,
        "exit" => {
            let (code, reason) = match rest.split_once(char::is_whitespace) {
                Some((code, reason)) => (code, Some(reason.trim().to_string())),
                None => (rest, None),
            };
            Command::Exit {
                status: code
                    .parse()
                    .with_context(|| format!("exit: bad status `{code}`"))?,
                description: reason.filter(|r| !r.is_empty()),
            }
        }
        "kill" => Command::Kill,
        "status" => Command::Status,
        "recent" => Command::Recent,
        "help" | "?" => Command::Help,
        "quit" | "q" => Command::Quit,
        other => bail!("unknown command `{other}` (try `help`)"),
    };
    Ok(Some(cmd))
}

fn path_arg(rest: &str, word: &str) -> Result<PathBuf> {
    if rest.is_empty() {
        bail!("{word}: missing path");
    }
    Ok(PathBuf::from(rest))
}

fn location(arg: &str) -> Result<(PathBuf, u32)> {
    let (file, line) = arg
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("expected FILE:LINE, got `{arg}`"))?;
    if file.is_empty() {
        bail!("expected FILE:LINE, got `{arg}`");
    }
    let line = line
        .parse()
        .with_context(|| format!("bad line number in `{arg}`"))?;
    Ok((PathBuf::from(file), line))
}

fn thread_id(arg: &str) -> Result<u64> {
    let parsed = match arg.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => arg.parse(),
    };
    parsed.with_context(|| format!("thread: bad id `{arg}`"))
}

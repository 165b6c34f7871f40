mod commands;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use loupe_config::{load_config, Config};
use loupe_core::logging::{
    level_filter, log_file_in, prepare_log_file, DEFAULT_MAX_LOG_FILES, DEFAULT_MAX_LOG_SIZE,
};
use loupe_core::ConsoleLog;
use loupe_engine::{event_channel, Frame, InMemoryEngine, ScriptedThread, ThreadId};
use loupe_platform::{DefaultPaths, FixedPaths, PlatformPaths};
use loupe_session::{Bootstrap, JsonProjectStore, Phase, Surface, Synchronizer, Topic};

use crate::commands::Command;

type Session = Bootstrap<InMemoryEngine, JsonProjectStore>;

/// Command-line options.
#[derive(Debug, Default)]
struct Options {
    log_level: Option<String>,
    target: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options> {
    let mut opts = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--log-level" => {
                opts.log_level = Some(args.next().context("--log-level needs a value")?);
            }
            _ => opts.target = Some(PathBuf::from(arg)),
        }
    }
    Ok(opts)
}

fn platform_paths() -> Result<Box<dyn PlatformPaths>> {
    match env::var_os("LOUPE_HOME") {
        Some(home) => Ok(Box::new(FixedPaths::new(home))),
        None => Ok(Box::new(
            DefaultPaths::new().context("failed to detect platform paths")?,
        )),
    }
}

fn init_logging(paths: &dyn PlatformPaths, config: &Config, level: Option<&str>) {
    let level = level.map_or(config.log.level.as_str(), level_filter);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let log_path = config
        .log
        .file
        .clone()
        .unwrap_or_else(|| log_file_in(&paths.log_dir()));

    let file = prepare_log_file(&log_path, DEFAULT_MAX_LOG_SIZE, DEFAULT_MAX_LOG_FILES).and_then(
        |()| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
        },
    );
    match file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init(),
        Err(e) => {
            eprintln!("loupe: cannot open {}: {e}; logging to stderr", log_path.display());
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("loupe: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let opts = parse_args(env::args().skip(1))?;
    let paths = platform_paths()?;

    let project_dir = env::current_dir().ok();
    let config = load_config(&paths.config_dir(), project_dir.as_deref());
    let config_err = config.as_ref().err().map(ToString::to_string);
    let config = config.unwrap_or_default();
    init_logging(paths.as_ref(), &config, opts.log_level.as_deref());
    if let Some(e) = config_err {
        error!("config load failed, using defaults: {e}");
    }
    info!("loupe starting");

    let (tx, rx) = event_channel();
    let mut sync = Synchronizer::new(InMemoryEngine::new(tx), rx)
        .with_console(ConsoleLog::with_max_entries(config.console.max_entries));
    sync.bus_mut().subscribe(Topic::Any, |surface, notification| {
        if *surface == Surface::Console {
            println!("{notification}");
        } else {
            println!("  [{surface}] {notification}");
        }
    });

    let store = JsonProjectStore::new(paths.project_file());
    let mut session = Bootstrap::new(sync, store, &config.session);
    if let Some(path) = session.start() {
        println!("auto-loaded {}", path.display());
    }
    if let Some(target) = &opts.target {
        if let Err(e) = session.load_target(target) {
            warn!("initial load failed: {e}");
        }
        session.sync_mut().process_pending();
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("(loupe) ");
        stdout.flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match commands::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(cmd)) => {
                if let Err(e) = execute(&mut session, cmd) {
                    println!("error: {e:#}");
                }
                session.sync_mut().process_pending();
            }
            Ok(None) => {}
            Err(e) => println!("error: {e:#}"),
        }
    }

    if let Err(e) = session.shutdown(None) {
        warn!("failed to save project state: {e}");
    }
    info!("loupe exited cleanly");
    Ok(())
}

fn execute(session: &mut Session, cmd: Command) -> Result<()> {
    match cmd {
        Command::Load(path) => session.load_target(&path)?,
        Command::Run => session.sync_mut().launch()?,
        Command::Attach(pid) => session.sync_mut().attach(pid)?,
        Command::Connect(uri) => session.sync_mut().connect(&uri)?,
        Command::Break { file, line } => session.sync_mut().toggle_breakpoint(&file, line)?,
        Command::Open(file) => session.sync_mut().editor_opened(&file),
        Command::Close(file) => {
            if !session.sync_mut().editor_closed(&file) {
                println!("{} was not open", file.display());
            }
        }
        Command::Stop(locations) => {
            let threads = locations
                .into_iter()
                .zip(1u64..)
                .map(|((file, line), id)| {
                    ScriptedThread::new(id, format!("thread-{id}"), vec![frame_at(&file, line)])
                })
                .collect();
            session.sync_mut().engine_mut().stop_at(threads, Some(1))?;
        }
        Command::Pause => {
            if session.sync().state().phase != Phase::Running {
                println!("process is not running");
            } else {
                session.sync_mut().toggle_pause()?;
            }
        }
        Command::Continue => {
            if session.sync().state().phase != Phase::Stopped {
                println!("process is not stopped");
            } else {
                session.sync_mut().toggle_pause()?;
            }
        }
        Command::Thread(id) => session.sync_mut().select_thread(ThreadId(id))?,
        Command::Frame(index) => session.sync_mut().select_frame(index)?,
        Command::Step => session.sync_mut().step_into()?,
        Command::Next => session.sync_mut().step_over()?,
        Command::Finish => session.sync_mut().step_out()?,
        Command::Exit {
            status,
            description,
        } => session
            .sync_mut()
            .engine_mut()
            .exit_process(status, description.as_deref())?,
        Command::Kill => session.sync_mut().kill()?,
        Command::Status => print_status(session),
        Command::Recent => {
            for entry in session.recents().menu_entries() {
                println!("{}", entry.label);
            }
        }
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => {}
    }
    Ok(())
}

fn frame_at(file: &Path, line: u32) -> Frame {
    let function = file
        .file_stem()
        .map_or_else(|| "??".to_string(), |s| s.to_string_lossy().into_owned());
    Frame::at(function, file, line)
}

fn print_status(session: &Session) {
    let state = session.sync().state();
    println!("phase: {}", state.phase);
    if let Some(target) = state.target_path() {
        println!("target: {}", target.display());
    }
    if let Some(process) = &state.process {
        println!("pid: {}", process.pid);
    }
    for thread in &state.threads {
        let mark = if thread.is_current { '*' } else { ' ' };
        println!("{mark} thread {} {}", thread.id, thread.name);
    }
    println!("breakpoints: {}", state.breakpoints.len());
    println!(
        "open editors: {}",
        state
            .open_editors
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

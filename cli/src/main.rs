//! PhotoArc - command-line entry point for the archive engine.
//!
//! One positional command word selects what to do: ARCHIVE replaces aged
//! day directories with symlinks to their backup copies, EVACUATION moves
//! whole year directories to the secondary store, CONFIGLIST prints the
//! loaded settings. Settings come from `setting.ini` next to the
//! executable.

use std::path::Path;

use chrono::{Local, NaiveDate};
use clap::Parser;
use engine::{config, workflow, ArchiveError, Configuration, FileLog, LogSink, RunContext, RunKind};

/// PhotoArc - reclaim photo archive space
#[derive(Parser, Debug)]
#[command(name = "photoarc")]
#[command(version = "0.1.0")]
#[command(about = "Replace backed-up photo directories with symlinks to reclaim space")]
struct Args {
    /// Command to run: ARCHIVE, EVACUATION or CONFIGLIST (case-insensitive)
    #[arg(value_name = "COMMAND")]
    command: Option<String>,
}

/// What the command word resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run(RunKind),
    ConfigList,
}

fn parse_command(word: Option<&str>) -> Result<Command, String> {
    let Some(word) = word else {
        return Err("no command given; expected ARCHIVE, EVACUATION or CONFIGLIST".to_string());
    };
    match word.to_uppercase().as_str() {
        "ARCHIVE" => Ok(Command::Run(RunKind::Archive)),
        "EVACUATION" => Ok(Command::Run(RunKind::Evacuation)),
        "CONFIGLIST" => Ok(Command::ConfigList),
        _ => Err(format!(
            "unknown command '{}'; expected ARCHIVE, EVACUATION or CONFIGLIST",
            word
        )),
    }
}

fn main() {
    let args = Args::parse();
    if let Err(msg) = run_cli(&args, &config::default_path()) {
        eprintln!("Error: {}", msg);
    }
    // The process exits 0 even after a failure: the schedulers driving
    // this tool treat any other status as an immediate-retry signal,
    // which would hammer a broken share all night. Diagnostics go to
    // stderr and the daily log instead.
}

/// Main CLI logic - separated from `main` (and parameterized over the
/// settings path) for testability.
fn run_cli(args: &Args, config_path: &Path) -> Result<(), String> {
    let settings = config::load(config_path).map_err(|e| e.to_string())?;
    let today = Local::now().date_naive();

    let log_dir = settings
        .log_dir
        .clone()
        .ok_or_else(|| ArchiveError::ConfigKey { key: "LogDirectory" }.to_string())?;
    let log = FileLog::open(&log_dir, today).map_err(|e| e.to_string())?;

    // Any failure past this point gets one WARN line in the daily log in
    // addition to the stderr diagnostic.
    let outcome = dispatch(&settings, &log, today, args.command.as_deref());
    if let Err(ref message) = outcome {
        log.warn(message);
    }
    outcome
}

fn dispatch(
    settings: &Configuration,
    log: &FileLog,
    today: NaiveDate,
    word: Option<&str>,
) -> Result<(), String> {
    match parse_command(word)? {
        Command::ConfigList => {
            let rendered = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
            println!("{}", rendered);
            Ok(())
        }
        Command::Run(kind) => {
            let ctx = RunContext::new(settings, log, today);
            let summary = workflow::run(&ctx, kind).map_err(|e| e.to_string())?;
            println!(
                "{}: replaced={} skipped={} misses={}",
                kind, summary.replaced, summary.skipped, summary.misses
            );
            Ok(())
        }
    }
}

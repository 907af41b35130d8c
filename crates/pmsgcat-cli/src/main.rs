use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use glob::glob;
use time::OffsetDateTime;

use pmsgcat_core::{DecodeOptions, DecodedLog, LogRecord, decode_pmsg_file};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PMSGCAT_BUILD_COMMIT"),
    " ",
    env!("PMSGCAT_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "pmsgcat")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decode Android pmsg (persistent message store) dumps into logcat-style text or JSON.",
    long_about = None,
    after_help = "Examples:\n  pmsgcat /sys/fs/pstore/pmsg-ramoops-0\n  pmsgcat pmsg.bin --json --pretty\n  pmsgcat pmsg.bin -v --strict"
)]
struct Cli {
    /// Path to a pmsg dump (a glob pattern must match exactly one file)
    input: PathBuf,

    /// Emit note-level diagnostics (per-entry field dumps, skip notices)
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Print records and diagnostics as JSON instead of text lines
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, requires = "json")]
    pretty: bool,

    /// Suppress non-error status output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code when the decode reported errors
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let input = resolve_input_path(&cli.input)?;

    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a pmsg dump such as /sys/fs/pstore/pmsg-ramoops-0".to_string()),
        ));
    }
    let meta = fs::metadata(&input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a regular file containing a pmsg dump".to_string()),
        ));
    }
    if meta.len() == 0 {
        println!("File is empty.");
        return Ok(());
    }

    let options = DecodeOptions {
        verbose: cli.verbose,
    };
    let log = decode_pmsg_file(&input, options).map_err(|err| {
        CliError::new(
            format!("failed to decode {}: {}", input.display(), err),
            None,
        )
    })?;

    print_diagnostics(&log);

    if cli.json {
        let json = serialize_log(&log, cli.pretty)?;
        println!("{}", json);
    } else {
        for record in &log.records {
            println!("{}", format_record(record));
        }
        if log.records.is_empty() && !cli.quiet {
            eprintln!("no valid log entries found");
        }
    }

    if cli.strict && log.has_errors() {
        return Err(CliError::new(
            "decode errors detected",
            Some("rerun with -v for per-entry detail".to_string()),
        ));
    }
    Ok(())
}

fn print_diagnostics(log: &DecodedLog) {
    for diagnostic in &log.diagnostics {
        eprintln!(
            "{}: offset {}: {}",
            diagnostic.severity.label(),
            diagnostic.offset,
            diagnostic.message
        );
    }
}

fn serialize_log(log: &DecodedLog, pretty: bool) -> Result<String, CliError> {
    if pretty {
        serde_json::to_string_pretty(log)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(log)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

/// Render one record in logcat brief form:
/// `MM-DD HH:MM:SS.mmm    pid    tid L tag: message` (UTC).
fn format_record(record: &LogRecord) -> String {
    let (tag, message) = match record.tag.as_deref() {
        Some(tag) => (tag, record.message.as_str()),
        // Header-only entry: no priority, tag or message were present.
        None => ("", "<No payload>"),
    };
    format!(
        "{}  {:>5}  {:>5} {} {}: {}",
        format_timestamp(record.timestamp),
        record.pid,
        record.tid,
        record.level,
        tag,
        message
    )
}

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    format!(
        "{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
        u8::from(timestamp.month()),
        timestamp.day(),
        timestamp.hour(),
        timestamp.minute(),
        timestamp.second(),
        timestamp.millisecond()
    )
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches); matches: {}",
            pattern,
            matches.len(),
            listed
        );
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(
            message,
            Some("pass a single dump, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

/*!
 * Copia CLI - run backup routines by name
 */

use clap::{Parser, ValueEnum};
use copia::{
    config::{LogConfig, LogLevel, RunOptions, TransferMode, DEFAULT_LOG_FILE},
    core::events::TracingSink,
    error::{Result, EXIT_SUCCESS},
    logging,
    routines::RoutineBook,
    runner::RoutineRunner,
    VERSION,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "copia")]
#[command(version, about = "Copy or compress named backup routines into every destination", long_about = None)]
struct Cli {
    /// Routines to run, in order
    #[arg(value_name = "ROUTINE", required = true, num_args = 1..)]
    routines: Vec<String>,

    /// Verify destinations after the backup
    #[arg(short = 'v', long = "verify")]
    verify: bool,

    /// Compress each source into a zip archive
    #[arg(short = 'c', long = "compress")]
    compress: bool,

    /// Do not prefix outputs with the run's timestamp
    #[arg(short = 't', long = "no-timestamp", visible_alias = "timestamp")]
    no_timestamp: bool,

    /// Routine definitions file (default: routines.json next to the executable)
    #[arg(long = "routines", value_name = "FILE")]
    routines_file: Option<PathBuf>,

    /// Detailed log file, truncated on every run
    #[arg(long = "log-file", value_name = "FILE", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Detailed log level
    #[arg(long = "log-level", value_enum, default_value = "debug")]
    log_level: LogLevelArg,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            verify: self.verify,
            mode: if self.compress {
                TransferMode::Compress
            } else {
                TransferMode::Copy
            },
            timestamp: !self.no_timestamp,
            routine_names: self.routines.clone(),
        }
    }

    fn log_config(&self) -> LogConfig {
        LogConfig {
            log_file: self.log_file.clone(),
            level: self.log_level.into(),
        }
    }
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!("run aborted: {}", e.chain());
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(&cli.log_config()) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }
    tracing::debug!("Copia Backups v{} started", VERSION);

    let routines_path = match cli.routines_file {
        Some(ref path) => path.clone(),
        None => RoutineBook::default_path()?,
    };
    let book = RoutineBook::load(&routines_path)?;
    tracing::debug!(
        "loaded {} routines from {}",
        book.len(),
        routines_path.display()
    );

    let options = cli.run_options();
    let summary = RoutineRunner::new(&book, &TracingSink).run(&options)?;

    let code = summary.exit_code();
    if code == EXIT_SUCCESS {
        tracing::debug!(
            "all {} routines finished, {} items missing after verification",
            summary.outcomes.len(),
            summary.missing_items()
        );
    } else {
        let failed: Vec<&str> = summary.failed().map(|o| o.name.as_str()).collect();
        tracing::debug!("routines failed: {}", failed.join(", "));
    }
    Ok(code)
}

/*!
 * Configuration types for Copia
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default detailed log file, created in the working directory
pub const DEFAULT_LOG_FILE: &str = "copia.log";

/// Options for one run, fixed once the command line is parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Verify destinations after each routine's transfer
    #[serde(default)]
    pub verify: bool,

    /// Copy sources as-is or compress each into a zip archive
    #[serde(default)]
    pub mode: TransferMode,

    /// Prefix every output name with the run's timestamp
    #[serde(default = "default_true")]
    pub timestamp: bool,

    /// Routines to run, in order
    #[serde(default)]
    pub routine_names: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            verify: false,
            mode: TransferMode::Copy,
            timestamp: true,
            routine_names: Vec::new(),
        }
    }
}

impl RunOptions {
    /// Options that only carry into a single transfer-all call
    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            verify: self.verify,
            timestamp: self.timestamp,
        }
    }
}

/// Per-call options for a transfer-all pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferOptions {
    pub verify: bool,
    pub timestamp: bool,
}

/// How sources reach their destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Recursive copy with metadata
    #[default]
    Copy,
    /// One deflate zip archive per source
    Compress,
}

impl std::fmt::Display for TransferMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferMode::Copy => write!(f, "copy"),
            TransferMode::Compress => write!(f, "compress"),
        }
    }
}

/// Log level for the detailed log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,
    /// Warnings and errors
    Warn,
    /// Info, warnings, and errors
    Info,
    /// Debug and above
    #[default]
    Debug,
    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Where and how verbosely the detailed log is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_file: PathBuf,
    pub level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            level: LogLevel::Debug,
        }
    }
}

fn default_true() -> bool {
    true
}

/*!
 * Copia - routine-driven backups
 *
 * Copies or compresses named groups of source paths into every destination
 * of the group:
 * - Validation of all paths before anything is written
 * - Recursive copy that keeps timestamps and permissions
 * - One deflate zip archive per source in compress mode
 * - Optional timestamp prefix shared by a whole run
 * - Existence check of every expected output after the transfer
 *
 * Version: 1.1.0
 */

pub mod compression;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod routines;
pub mod runner;

// Re-export commonly used types
pub use config::{LogConfig, LogLevel, RunOptions, TransferMode, TransferOptions};
pub use core::events::{EventSink, MemorySink, NullSink, TracingSink};
pub use core::manager::TransferManager;
pub use core::strategy::TransferStrategy;
pub use core::TransferReport;
pub use error::{CopiaError, Result};
pub use routines::{Routine, RoutineBook};
pub use runner::{RoutineRunner, RunSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

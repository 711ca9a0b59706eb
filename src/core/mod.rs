/*!
 * Core transfer engine: validation, copy, compress and verification
 */

pub mod directory;
pub mod events;
pub mod manager;
pub mod metadata;
pub mod naming;
pub mod strategy;
pub mod validation;
pub mod verify;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::TransferMode;
use crate::error::{CopiaError, Result};

use naming::TimestampPrefix;
use verify::VerificationReport;

/// What one source produced in one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTransfer {
    /// Top-level entry created in the destination (directory, file or archive)
    pub output: PathBuf,
    pub files: u64,
    pub bytes: u64,
}

/// Outcome of one transfer-all pass
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub mode: TransferMode,
    pub prefix: TimestampPrefix,
    pub outputs: Vec<PathBuf>,
    pub files_transferred: u64,
    pub bytes_transferred: u64,
    pub sources_skipped: u64,
    pub verification: Option<VerificationReport>,
    pub duration: Duration,
}

impl TransferReport {
    pub fn new(mode: TransferMode, prefix: TimestampPrefix) -> Self {
        Self {
            mode,
            prefix,
            outputs: Vec::new(),
            files_transferred: 0,
            bytes_transferred: 0,
            sources_skipped: 0,
            verification: None,
            duration: Duration::ZERO,
        }
    }

    pub(crate) fn record(&mut self, transfer: Option<SourceTransfer>) {
        match transfer {
            Some(transfer) => {
                self.files_transferred += transfer.files;
                self.bytes_transferred += transfer.bytes;
                self.outputs.push(transfer.output);
            }
            None => self.sources_skipped += 1,
        }
    }

    /// Missing items found by verification, zero when it did not run
    pub fn missing_items(&self) -> usize {
        self.verification
            .as_ref()
            .map_or(0, VerificationReport::missing_count)
    }
}

/// Path of `entry` below `root`, for entries yielded by walking `root`
pub(crate) fn relative_to<'a>(root: &Path, entry: &'a Path) -> Result<&'a Path> {
    entry.strip_prefix(root).map_err(|_| CopiaError::Transfer {
        path: entry.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("entry is outside of {}", root.display()),
        ),
    })
}

/// Removes a partially written file unless the write was committed
pub(crate) struct PartialOutput {
    path: PathBuf,
    armed: bool,
}

impl PartialOutput {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: true,
        }
    }

    pub(crate) fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!(
                    "failed to clean up partial output {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_report_records_outcomes() {
        let mut report = TransferReport::new(TransferMode::Copy, TimestampPrefix::none());
        report.record(Some(SourceTransfer {
            output: PathBuf::from("/b/docs"),
            files: 3,
            bytes: 30,
        }));
        report.record(None);

        assert_eq!(report.files_transferred, 3);
        assert_eq!(report.bytes_transferred, 30);
        assert_eq!(report.sources_skipped, 1);
        assert_eq!(report.outputs, vec![PathBuf::from("/b/docs")]);
        assert_eq!(report.missing_items(), 0);
    }

    #[test]
    fn test_relative_to() {
        let rel = relative_to(Path::new("/src/docs"), Path::new("/src/docs/sub/a.txt")).unwrap();
        assert_eq!(rel, Path::new("sub/a.txt"));
        assert!(relative_to(Path::new("/src/docs"), Path::new("/elsewhere")).is_err());
    }

    #[test]
    fn test_partial_output_removed_unless_committed() {
        let dir = tempdir().unwrap();
        let dropped = dir.path().join("dropped.part");
        let kept = dir.path().join("kept.part");
        std::fs::write(&dropped, b"half").unwrap();
        std::fs::write(&kept, b"whole").unwrap();

        drop(PartialOutput::new(&dropped));
        PartialOutput::new(&kept).commit();

        assert!(!dropped.exists());
        assert!(kept.exists());
    }
}

/*!
 * Transfer strategies: copy or compress, chosen once per routine
 */

use std::path::Path;
use std::time::Instant;

use super::directory::copy_source;
use super::events::EventSink;
use super::naming::TimestampPrefix;
use super::validation::{ValidatedPaths, ValidatedSource};
use super::verify::{verify_archives, verify_copies, VerificationReport};
use super::{SourceTransfer, TransferReport};
use crate::compression::compress_source;
use crate::config::{TransferMode, TransferOptions};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStrategy {
    /// Recursive copy with metadata into `destination/<prefix><name>`
    Copy,
    /// Deflate zip archive at `destination/<prefix><name>.zip`
    Compress,
}

impl From<TransferMode> for TransferStrategy {
    fn from(mode: TransferMode) -> Self {
        match mode {
            TransferMode::Copy => TransferStrategy::Copy,
            TransferMode::Compress => TransferStrategy::Compress,
        }
    }
}

impl TransferStrategy {
    pub fn mode(self) -> TransferMode {
        match self {
            TransferStrategy::Copy => TransferMode::Copy,
            TransferStrategy::Compress => TransferMode::Compress,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            TransferStrategy::Copy => "copying",
            TransferStrategy::Compress => "compressing",
        }
    }

    /// Transfer every source into every destination, destination-major.
    ///
    /// One timestamp prefix is computed up front and shared by every output
    /// and by the verification pass. The first transfer error ends the call.
    pub fn transfer_all(
        self,
        paths: &ValidatedPaths,
        options: TransferOptions,
        sink: &dyn EventSink,
    ) -> Result<TransferReport> {
        let start = Instant::now();
        let prefix = TimestampPrefix::for_call(options.timestamp);
        let mut report = TransferReport::new(self.mode(), prefix);

        sink.debug(format_args!(
            "request received: {} all sources into all destinations",
            self.verb()
        ));

        for destination in paths.destinations() {
            sink.debug(format_args!(
                "{} into destination: {}",
                self.verb(),
                destination.display()
            ));
            for source in paths.sources() {
                sink.debug(format_args!(
                    "    {} from origin: {}",
                    self.verb(),
                    source.path().display()
                ));
                let transfer = self.transfer_one(source, destination, &report.prefix, sink)?;
                report.record(transfer);
            }
        }

        if options.verify {
            report.verification = Some(self.verify(paths, &report.prefix, sink));
        }

        report.duration = start.elapsed();
        sink.debug(format_args!(
            "{} process finished in {:?}",
            self.mode(),
            report.duration
        ));
        Ok(report)
    }

    fn transfer_one(
        self,
        source: &ValidatedSource,
        destination: &Path,
        prefix: &TimestampPrefix,
        sink: &dyn EventSink,
    ) -> Result<Option<SourceTransfer>> {
        match self {
            TransferStrategy::Copy => copy_source(source, destination, prefix, sink),
            TransferStrategy::Compress => compress_source(source, destination, prefix, sink),
        }
    }

    /// Verification pass matching this strategy's outputs
    pub fn verify(
        self,
        paths: &ValidatedPaths,
        prefix: &TimestampPrefix,
        sink: &dyn EventSink,
    ) -> VerificationReport {
        match self {
            TransferStrategy::Copy => verify_copies(paths, prefix, sink),
            TransferStrategy::Compress => verify_archives(paths, prefix, sink),
        }
    }
}

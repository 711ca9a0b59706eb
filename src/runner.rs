/*!
 * Routine runner: one transfer manager per requested routine
 */

use tracing::debug_span;

use crate::config::RunOptions;
use crate::core::events::EventSink;
use crate::core::manager::TransferManager;
use crate::core::strategy::TransferStrategy;
use crate::core::TransferReport;
use crate::error::{CopiaError, ErrorCategory, Result, EXIT_PARTIAL, EXIT_SUCCESS};
use crate::routines::{Routine, RoutineBook};

/// Outcome of one routine
#[derive(Debug)]
pub struct RoutineOutcome {
    pub name: String,
    pub result: Result<TransferReport>,
}

impl RoutineOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of every routine in a run, in execution order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<RoutineOutcome>,
}

impl RunSummary {
    pub fn failed(&self) -> impl Iterator<Item = &RoutineOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.succeeded())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Verification misses across all routines; informational only
    pub fn missing_items(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .map(TransferReport::missing_items)
            .sum()
    }

    /// Process exit status: verification misses never affect it
    pub fn exit_code(&self) -> i32 {
        if self.all_succeeded() {
            EXIT_SUCCESS
        } else {
            EXIT_PARTIAL
        }
    }
}

pub struct RoutineRunner<'a> {
    book: &'a RoutineBook,
    sink: &'a dyn EventSink,
}

impl<'a> RoutineRunner<'a> {
    pub fn new(book: &'a RoutineBook, sink: &'a dyn EventSink) -> Self {
        Self { book, sink }
    }

    /// Run every requested routine in order.
    ///
    /// All names are resolved first: an unknown name fails the whole run
    /// before anything is transferred. After that, routines are independent
    /// and a failing one does not stop the rest.
    pub fn run(&self, options: &RunOptions) -> Result<RunSummary> {
        let routines = self.book.resolve(&options.routine_names)?;
        let strategy = TransferStrategy::from(options.mode);

        let mut summary = RunSummary::default();
        for (name, routine) in routines {
            let result = self.run_routine(name, routine, strategy, options);
            summary.outcomes.push(RoutineOutcome {
                name: name.to_string(),
                result,
            });
        }
        Ok(summary)
    }

    /// Validate and transfer one routine, reporting any failure.
    pub fn run_routine(
        &self,
        name: &str,
        routine: &Routine,
        strategy: TransferStrategy,
        options: &RunOptions,
    ) -> Result<TransferReport> {
        let _span = debug_span!("routine", name = %name).entered();
        self.sink.debug(format_args!("starting routine {}", name));

        let result = self.transfer(routine, strategy, options);
        match &result {
            Ok(report) => self.sink.debug(format_args!(
                "routine {} finished: {} files, {} bytes, {} sources skipped, {} missing after verification",
                name,
                report.files_transferred,
                report.bytes_transferred,
                report.sources_skipped,
                report.missing_items()
            )),
            Err(err) => self.report_failure(name, err),
        }
        result
    }

    fn transfer(
        &self,
        routine: &Routine,
        strategy: TransferStrategy,
        options: &RunOptions,
    ) -> Result<TransferReport> {
        let mut manager = TransferManager::from_routine(routine, self.sink);
        manager.check_paths(self.sink)?;
        manager.transfer_all(strategy, options.transfer_options(), self.sink)
    }

    fn report_failure(&self, name: &str, err: &CopiaError) {
        let context = match err.category() {
            ErrorCategory::Path => {
                "error while checking the paths provided; files will not be transferred"
            }
            ErrorCategory::Transfer => "error while transferring",
            ErrorCategory::Configuration => "configuration error",
        };
        self.sink.error(format_args!(
            "routine {} aborted, {}: {} [{}]",
            name,
            context,
            err.chain(),
            err.category()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransferMode;
    use crate::core::events::MemorySink;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn options(names: &[&str]) -> RunOptions {
        RunOptions {
            verify: true,
            mode: TransferMode::Copy,
            timestamp: false,
            routine_names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn test_failed_routine_does_not_stop_others() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        let dest = dir.path().join("backup");
        fs::write(&source, b"a").unwrap();
        fs::create_dir(&dest).unwrap();

        let mut book = RoutineBook::default();
        book.insert(
            "broken",
            Routine {
                sources: vec![dir.path().join("missing")],
                destinations: vec![dest.clone()],
            },
        );
        book.insert(
            "good",
            Routine {
                sources: vec![source],
                destinations: vec![dest.clone()],
            },
        );

        let sink = MemorySink::new();
        let summary = RoutineRunner::new(&book, &sink)
            .run(&options(&["broken", "good"]))
            .unwrap();

        assert_eq!(summary.outcomes.len(), 2);
        assert!(!summary.outcomes[0].succeeded());
        assert!(summary.outcomes[1].succeeded());
        assert!(dest.join("a.txt").exists());
        assert_eq!(summary.exit_code(), EXIT_PARTIAL);

        let errors = sink.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("routine broken aborted"));
        assert!(errors[0].contains("source path doesn't exist"));
    }

    #[test]
    fn test_unknown_routine_is_fatal() {
        let book = RoutineBook::default();
        let sink = MemorySink::new();
        let err = RoutineRunner::new(&book, &sink)
            .run(&options(&["nope"]))
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unknown_name_stops_before_any_transfer() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, b"a").unwrap();

        let mut book = RoutineBook::default();
        book.insert(
            "good",
            Routine {
                sources: vec![source],
                destinations: vec![dir.path().to_path_buf()],
            },
        );

        let result = RoutineRunner::new(&book, &MemorySink::new()).run(&options(&["good", "typo"]));
        assert!(matches!(result, Err(CopiaError::UnknownRoutine(_))));
    }

    #[test]
    fn test_verification_misses_keep_success_exit() {
        let summary = RunSummary {
            outcomes: vec![RoutineOutcome {
                name: "docs".into(),
                result: Ok({
                    let mut report = TransferReport::new(
                        TransferMode::Copy,
                        crate::core::naming::TimestampPrefix::none(),
                    );
                    report.verification = Some(crate::core::verify::VerificationReport {
                        checked: 3,
                        missing: vec![PathBuf::from("/b/docs/a.txt")],
                    });
                    report
                }),
            }],
        };
        assert_eq!(summary.missing_items(), 1);
        assert_eq!(summary.exit_code(), EXIT_SUCCESS);
    }

    #[test]
    fn test_routine_span_and_events() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        let dest = dir.path().join("backup");
        fs::create_dir(&docs).unwrap();
        fs::write(docs.join("one.txt"), b"1").unwrap();
        fs::create_dir(&dest).unwrap();

        let routine = Routine {
            sources: vec![docs],
            destinations: vec![dest.clone()],
        };
        let book = RoutineBook::default();
        let sink = MemorySink::new();
        let report = RoutineRunner::new(&book, &sink)
            .run_routine("docs", &routine, TransferStrategy::Compress, &options(&[]))
            .unwrap();

        assert_eq!(report.outputs, vec![dest.join("docs.zip")]);
        assert!(sink.contains("starting routine docs"));
        assert!(sink.contains("routine docs finished"));
    }
}

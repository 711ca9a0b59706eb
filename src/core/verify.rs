//! Post-transfer verification
//!
//! Verification only checks that expected outputs exist; it never reads file
//! contents, never writes, and never fails. Every missing path is logged and
//! counted, and the total is reported at the end.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::events::EventSink;
use super::naming::{archive_target, copy_target, TimestampPrefix};
use super::relative_to;
use super::validation::ValidatedPaths;

/// Result of one verification pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Expected paths that were looked up
    pub checked: usize,
    /// Expected paths that were not found, in discovery order
    pub missing: Vec<PathBuf>,
}

impl VerificationReport {
    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
    }

    fn expect(&mut self, path: &Path, kind: &str, sink: &dyn EventSink) -> bool {
        self.checked += 1;
        if path.exists() {
            true
        } else {
            sink.error(format_args!("    this {} was not created: {}", kind, path.display()));
            self.missing.push(path.to_path_buf());
            false
        }
    }
}

/// Confirm each copied directory tree and file is present in every destination.
///
/// A missing directory counts once; the files directly inside it are not
/// counted again, but its subdirectories are still visited.
pub fn verify_copies(
    paths: &ValidatedPaths,
    prefix: &TimestampPrefix,
    sink: &dyn EventSink,
) -> VerificationReport {
    sink.debug(format_args!("verify method started"));
    let mut report = VerificationReport::default();
    let destinations = paths.destinations();

    for (index, source) in paths.sources().iter().enumerate() {
        let position = index + 1;
        let source_path = source.path();
        sink.debug(format_args!(
            "verifying source path {}: {}",
            position,
            source_path.display()
        ));
        sink.debug(format_args!(
            "source path {} will be checked for all destination folders (total amount = {})",
            position,
            destinations.len()
        ));

        if source_path.is_dir() {
            let roots: Vec<PathBuf> = destinations
                .iter()
                .map(|destination| copy_target(destination, source.name(), prefix))
                .collect();
            verify_tree(source_path, &roots, &mut report, sink);
        } else if source_path.is_file() {
            for destination in destinations {
                let expected = copy_target(destination, source.name(), prefix);
                report.expect(&expected, "file", sink);
            }
        } else {
            sink.debug(format_args!(
                "source path {} is neither a folder nor a file, nothing to verify",
                position
            ));
        }

        sink.debug(format_args!(
            "finished verifying source path {}: {}",
            position,
            source_path.display()
        ));
    }

    finish(&report, "verify method", sink);
    report
}

fn verify_tree(
    source_root: &Path,
    dest_roots: &[PathBuf],
    report: &mut VerificationReport,
    sink: &dyn EventSink,
) {
    let mut missing_dirs: HashSet<PathBuf> = HashSet::new();

    for entry in WalkDir::new(source_root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                sink.error(format_args!("    cannot read source entry: {}", e));
                continue;
            }
        };
        let relative = match relative_to(source_root, entry.path()) {
            Ok(relative) => relative,
            Err(e) => {
                sink.error(format_args!("    {}", e));
                continue;
            }
        };

        let is_dir = entry.file_type().is_dir();
        if !is_dir && !entry.file_type().is_file() {
            continue;
        }
        sink.debug(format_args!("    source {}", entry.path().display()));

        for dest_root in dest_roots {
            let expected = if relative.as_os_str().is_empty() {
                dest_root.clone()
            } else {
                dest_root.join(relative)
            };

            if is_dir {
                if !report.expect(&expected, "directory", sink) {
                    missing_dirs.insert(expected);
                }
            } else {
                let parent_missing = expected
                    .parent()
                    .is_some_and(|parent| missing_dirs.contains(parent));
                if !parent_missing {
                    report.expect(&expected, "file", sink);
                }
            }
        }
    }
}

/// Confirm each source's archive is present in every destination
pub fn verify_archives(
    paths: &ValidatedPaths,
    prefix: &TimestampPrefix,
    sink: &dyn EventSink,
) -> VerificationReport {
    sink.debug(format_args!("verify method for .zip backup started"));
    let mut report = VerificationReport::default();
    let destinations = paths.destinations();

    for (index, source) in paths.sources().iter().enumerate() {
        sink.debug(format_args!(
            "verifying source path {}: {}",
            index + 1,
            source.path().display()
        ));
        sink.debug(format_args!(
            "source path {} will be checked for all destination folders (total amount = {})",
            index + 1,
            destinations.len()
        ));
        if !source.path().is_dir() && !source.path().is_file() {
            sink.debug(format_args!(
                "source path {} is neither a folder nor a file, nothing to verify",
                index + 1
            ));
            continue;
        }
        for destination in destinations {
            let expected = archive_target(destination, source.name(), prefix);
            report.expect(&expected, "zipped file", sink);
        }
    }

    finish(&report, "verify method for .zip backup", sink);
    report
}

fn finish(report: &VerificationReport, what: &str, sink: &dyn EventSink) {
    if report.is_clean() {
        sink.debug(format_args!("{} finished - no errors found", what));
    } else {
        sink.debug(format_args!(
            "{} finished; amount of errors found: {}",
            what,
            report.missing_count()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directory::copy_tree;
    use crate::core::events::MemorySink;
    use crate::core::validation::validate_paths;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        _dir: TempDir,
        source: PathBuf,
        dest: PathBuf,
    }

    fn copied_tree() -> Fixture {
        let dir = tempdir().unwrap();
        let source = dir.path().join("docs");
        let dest = dir.path().join("backup");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("a.txt"), b"a").unwrap();
        fs::write(source.join("b.txt"), b"b").unwrap();
        fs::write(source.join("sub/c.txt"), b"c").unwrap();
        fs::write(source.join("sub/d.txt"), b"d").unwrap();
        fs::create_dir(&dest).unwrap();
        copy_tree(&source, &dest.join("docs"), &MemorySink::new()).unwrap();
        Fixture {
            _dir: dir,
            source,
            dest,
        }
    }

    fn validated(fixture: &Fixture) -> ValidatedPaths {
        validate_paths(
            &[fixture.source.clone()],
            &[fixture.dest.clone()],
            &MemorySink::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_clean_copy_has_no_missing_items() {
        let fixture = copied_tree();
        let sink = MemorySink::new();
        let report = verify_copies(&validated(&fixture), &TimestampPrefix::none(), &sink);

        assert!(report.is_clean());
        // two directories and four files
        assert_eq!(report.checked, 6);
        assert!(sink.errors().is_empty());
        assert!(sink.contains("no errors found"));
    }

    #[test]
    fn test_deleted_files_counted() {
        let fixture = copied_tree();
        fs::remove_file(fixture.dest.join("docs/a.txt")).unwrap();
        fs::remove_file(fixture.dest.join("docs/sub/d.txt")).unwrap();

        let sink = MemorySink::new();
        let report = verify_copies(&validated(&fixture), &TimestampPrefix::none(), &sink);

        assert_eq!(report.missing_count(), 2);
        assert_eq!(sink.errors().len(), 2);
        assert!(report.missing.contains(&fixture.dest.join("docs/sub/d.txt")));
    }

    #[test]
    fn test_missing_directory_counted_once() {
        let fixture = copied_tree();
        fs::remove_dir_all(fixture.dest.join("docs/sub")).unwrap();

        let report = verify_copies(&validated(&fixture), &TimestampPrefix::none(), &MemorySink::new());
        assert_eq!(report.missing, vec![fixture.dest.join("docs/sub")]);
    }

    #[test]
    fn test_prefix_applied_to_expected_paths() {
        let fixture = copied_tree();
        let prefix = TimestampPrefix::at(
            chrono::NaiveDate::from_ymd_opt(2024, 5, 6)
                .unwrap()
                .and_hms_opt(7, 8, 0)
                .unwrap(),
        );

        let report = verify_copies(&validated(&fixture), &prefix, &MemorySink::new());
        // nothing exists under the prefixed name; each directory counts once
        assert_eq!(
            report.missing,
            vec![
                fixture.dest.join("2024-05-06_07-08_docs"),
                fixture.dest.join("2024-05-06_07-08_docs/sub"),
            ]
        );
    }

    #[test]
    fn test_file_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        let dest_a = dir.path().join("a");
        let dest_b = dir.path().join("b");
        fs::write(&source, b"n").unwrap();
        fs::create_dir(&dest_a).unwrap();
        fs::create_dir(&dest_b).unwrap();
        fs::write(dest_a.join("notes.txt"), b"n").unwrap();

        let paths = validate_paths(&[source], &[dest_a, dest_b.clone()], &MemorySink::new()).unwrap();
        let report = verify_copies(&paths, &TimestampPrefix::none(), &MemorySink::new());

        assert_eq!(report.checked, 2);
        assert_eq!(report.missing, vec![dest_b.join("notes.txt")]);
    }

    #[test]
    fn test_archives() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("docs");
        let dest = dir.path().join("backup");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&dest).unwrap();

        let paths = validate_paths(&[source], &[dest.clone()], &MemorySink::new()).unwrap();

        let sink = MemorySink::new();
        let report = verify_archives(&paths, &TimestampPrefix::none(), &sink);
        assert_eq!(report.missing, vec![dest.join("docs.zip")]);
        assert!(sink.contains("amount of errors found: 1"));

        fs::write(dest.join("docs.zip"), b"PK").unwrap();
        let report = verify_archives(&paths, &TimestampPrefix::none(), &MemorySink::new());
        assert!(report.is_clean());
        assert_eq!(report.checked, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_special_sources_not_expected() {
        use std::os::unix::net::UnixListener;

        let dir = tempdir().unwrap();
        let socket = dir.path().join("sock");
        let dest = dir.path().join("backup");
        fs::create_dir(&dest).unwrap();
        let _listener = UnixListener::bind(&socket).unwrap();

        let paths = validate_paths(&[socket], &[dest], &MemorySink::new()).unwrap();
        let sink = MemorySink::new();

        let archives = verify_archives(&paths, &TimestampPrefix::none(), &sink);
        assert_eq!(archives.checked, 0);
        assert!(archives.is_clean());

        let copies = verify_copies(&paths, &TimestampPrefix::none(), &sink);
        assert_eq!(copies.checked, 0);
        assert!(sink.errors().is_empty());
    }
}

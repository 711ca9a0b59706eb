/*!
 * Output naming: timestamp prefix and destination entry paths
 */

use chrono::{Local, NaiveDateTime};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// strftime pattern of the prefix, e.g. `2024-03-09_14-05_`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M_";

/// Extension given to archives in compress mode
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Prefix shared by every output of one transfer-all call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampPrefix(String);

impl TimestampPrefix {
    /// Empty prefix (timestamps disabled)
    pub fn none() -> Self {
        Self(String::new())
    }

    /// Prefix for the current local time
    pub fn now() -> Self {
        Self::at(Local::now().naive_local())
    }

    pub fn at(time: NaiveDateTime) -> Self {
        Self(time.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Computed once per transfer-all call
    pub fn for_call(enabled: bool) -> Self {
        if enabled {
            Self::now()
        } else {
            Self::none()
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `<prefix><name>`
    pub fn apply(&self, name: &OsStr) -> OsString {
        let mut prefixed = OsString::from(&self.0);
        prefixed.push(name);
        prefixed
    }
}

impl std::fmt::Display for TimestampPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `destination/<prefix><name>`
pub fn copy_target(destination: &Path, name: &OsStr, prefix: &TimestampPrefix) -> PathBuf {
    destination.join(prefix.apply(name))
}

/// `destination/<prefix><name>.zip`
pub fn archive_target(destination: &Path, name: &OsStr, prefix: &TimestampPrefix) -> PathBuf {
    let mut file_name = prefix.apply(name);
    file_name.push(".");
    file_name.push(ARCHIVE_EXTENSION);
    destination.join(file_name)
}

/// Name a source's outputs are built from.
///
/// Uses the final path component; paths such as `.` fall back to the
/// canonical form so they still get their directory's name.
pub fn source_name(source: &Path) -> Option<OsString> {
    if let Some(name) = source.file_name() {
        return Some(name.to_os_string());
    }
    std::fs::canonicalize(source)
        .ok()
        .and_then(|canonical| canonical.file_name().map(OsStr::to_os_string))
}

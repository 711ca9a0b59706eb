/*!
 * Path validation ahead of any transfer
 */

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use super::events::EventSink;
use super::naming::source_name;
use crate::error::{CopiaError, Result};

/// Which list a path was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    Source,
    Destination,
}

impl fmt::Display for PathRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathRole::Source => write!(f, "source"),
            PathRole::Destination => write!(f, "destination"),
        }
    }
}

/// A source that passed validation, with the name its outputs will carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSource {
    path: PathBuf,
    name: OsString,
}

impl ValidatedSource {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &OsStr {
        &self.name
    }
}

/// Snapshot of path lists that passed validation.
///
/// Only [`validate_paths`] builds one, and it cannot be edited afterwards, so
/// holding a `ValidatedPaths` means every path in it was checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPaths {
    sources: Vec<ValidatedSource>,
    destinations: Vec<PathBuf>,
}

impl ValidatedPaths {
    pub fn sources(&self) -> &[ValidatedSource] {
        &self.sources
    }

    pub fn destinations(&self) -> &[PathBuf] {
        &self.destinations
    }
}

/// Check every source exists and every destination is an existing directory.
///
/// Sources are checked before destinations, in declaration order; the first
/// failing path ends the check.
pub fn validate_paths(
    sources: &[PathBuf],
    destinations: &[PathBuf],
    sink: &dyn EventSink,
) -> Result<ValidatedPaths> {
    sink.debug(format_args!("checking paths provided"));

    let mut checked_sources = Vec::with_capacity(sources.len());
    for path in sources {
        checked_sources.push(check_source(path)?);
        sink.debug(format_args!(
            "this {} path exists: {}",
            PathRole::Source,
            path.display()
        ));
    }

    for path in destinations {
        check_destination(path)?;
        sink.debug(format_args!(
            "this {} path exists: {}",
            PathRole::Destination,
            path.display()
        ));
    }

    Ok(ValidatedPaths {
        sources: checked_sources,
        destinations: destinations.to_vec(),
    })
}

fn check_source(path: &Path) -> Result<ValidatedSource> {
    if !path.exists() {
        return Err(CopiaError::SourceNotFound(path.to_path_buf()));
    }
    let name = source_name(path).ok_or_else(|| CopiaError::UnnamedSource(path.to_path_buf()))?;
    Ok(ValidatedSource {
        path: path.to_path_buf(),
        name,
    })
}

fn check_destination(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(CopiaError::DestinationNotDirectory(path.to_path_buf())),
        Err(_) => Err(CopiaError::DestinationNotFound(path.to_path_buf())),
    }
}

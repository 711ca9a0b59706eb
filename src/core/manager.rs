//! Transfer Manager: the path lists for one routine invocation
//!
//! The manager is filled, validated, used for one transfer-all pass and then
//! dropped. Validation yields a [`ValidatedPaths`] snapshot that the transfer
//! strategies consume; editing either list afterwards discards that snapshot,
//! so a transfer always runs against paths that were checked as they are now.

use std::path::PathBuf;

use super::events::EventSink;
use super::strategy::TransferStrategy;
use super::validation::{validate_paths, ValidatedPaths};
use super::TransferReport;
use crate::config::TransferOptions;
use crate::error::{CopiaError, Result};
use crate::routines::Routine;

#[derive(Debug, Default)]
pub struct TransferManager {
    sources: Vec<PathBuf>,
    destinations: Vec<PathBuf>,
    validated: Option<ValidatedPaths>,
}

impl TransferManager {
    pub fn new(sink: &dyn EventSink) -> Self {
        sink.debug(format_args!("transfer manager created"));
        Self::default()
    }

    /// Manager holding a routine's declared paths, in declaration order
    pub fn from_routine(routine: &Routine, sink: &dyn EventSink) -> Self {
        let mut manager = Self::new(sink);
        for source in &routine.sources {
            manager.add_source(source.clone(), sink);
        }
        for destination in &routine.destinations {
            manager.add_destination(destination.clone(), sink);
        }
        manager
    }

    pub fn add_source(&mut self, path: impl Into<PathBuf>, sink: &dyn EventSink) {
        let path = path.into();
        sink.debug(format_args!("source path added: {}", path.display()));
        self.sources.push(path);
        self.invalidate();
    }

    pub fn add_destination(&mut self, path: impl Into<PathBuf>, sink: &dyn EventSink) {
        let path = path.into();
        sink.debug(format_args!("destination path added: {}", path.display()));
        self.destinations.push(path);
        self.invalidate();
    }

    /// Remove the source at `position`; out-of-range positions are reported, not fatal
    pub fn remove_source(&mut self, position: usize, sink: &dyn EventSink) -> Option<PathBuf> {
        sink.debug(format_args!("removing source path in position {}", position));
        let removed = remove_at(&mut self.sources, position, "source", sink);
        if removed.is_some() {
            self.invalidate();
        }
        removed
    }

    /// Remove the destination at `position`; out-of-range positions are reported, not fatal
    pub fn remove_destination(&mut self, position: usize, sink: &dyn EventSink) -> Option<PathBuf> {
        sink.debug(format_args!("removing destination path in position {}", position));
        let removed = remove_at(&mut self.destinations, position, "destination", sink);
        if removed.is_some() {
            self.invalidate();
        }
        removed
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn destinations(&self) -> &[PathBuf] {
        &self.destinations
    }

    /// True only if the current path lists passed the latest validation
    pub fn is_validated(&self) -> bool {
        self.validated.is_some()
    }

    /// Validate the current path lists.
    ///
    /// On failure the manager stays unvalidated and the error names the
    /// offending path and its role.
    pub fn check_paths(&mut self, sink: &dyn EventSink) -> Result<&ValidatedPaths> {
        self.validated = None;
        let validated = validate_paths(&self.sources, &self.destinations, sink)?;
        Ok(self.validated.insert(validated))
    }

    /// Run one transfer-all pass with `strategy`.
    ///
    /// Fails without touching the filesystem if the paths are not validated.
    pub fn transfer_all(
        &self,
        strategy: TransferStrategy,
        options: TransferOptions,
        sink: &dyn EventSink,
    ) -> Result<TransferReport> {
        let validated = self.validated.as_ref().ok_or(CopiaError::PathsNotValidated)?;
        strategy.transfer_all(validated, options, sink)
    }

    fn invalidate(&mut self) {
        self.validated = None;
    }
}

fn remove_at(
    list: &mut Vec<PathBuf>,
    position: usize,
    role: &str,
    sink: &dyn EventSink,
) -> Option<PathBuf> {
    if position < list.len() {
        let removed = list.remove(position);
        sink.debug(format_args!(
            "{} path in position {} removed: {}",
            role,
            position,
            removed.display()
        ));
        Some(removed)
    } else {
        sink.error(format_args!(
            "can't remove {} position {} (only {} paths)",
            role,
            position,
            list.len()
        ));
        None
    }
}

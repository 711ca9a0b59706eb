//! Routine definitions
//!
//! A routine is a named set of sources and destinations. Definitions are read
//! once at startup from `routines.json`, which lives next to the executable:
//!
//! ```json
//! {
//!     "docs": {
//!         "sources": ["/home/me/Documents", "/home/me/notes.txt"],
//!         "destinations": ["/mnt/backup"]
//!     }
//! }
//! ```
//!
//! A file with a `.toml` extension is read as TOML with the same shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::{CopiaError, Result};

/// File name looked up next to the executable
pub const ROUTINES_FILE_NAME: &str = "routines.json";

/// Errors that can occur while loading routine definitions
#[derive(Error, Debug)]
pub enum RoutineFileError {
    /// Definitions file could not be read
    #[error("cannot read routine definitions {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON definitions are malformed
    #[error("malformed routine definitions: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML definitions are malformed
    #[error("malformed routine definitions: {0}")]
    Toml(#[from] toml::de::Error),

    /// Definitions file holds no routines
    #[error("no routines defined in {0}")]
    Empty(PathBuf),

    /// Executable location could not be determined
    #[error("cannot locate the executable directory: {0}")]
    ExecutableDir(String),
}

impl From<RoutineFileError> for CopiaError {
    fn from(err: RoutineFileError) -> Self {
        CopiaError::Config(err.to_string())
    }
}

/// One declared backup routine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Routine {
    pub sources: Vec<PathBuf>,
    pub destinations: Vec<PathBuf>,
}

/// All routines, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutineBook {
    routines: BTreeMap<String, Routine>,
}

impl RoutineBook {
    /// Location of `routines.json` beside the running executable
    pub fn default_path() -> Result<PathBuf> {
        let exe = std::env::current_exe()
            .map_err(|e| RoutineFileError::ExecutableDir(e.to_string()))?;
        let dir = exe
            .parent()
            .ok_or_else(|| RoutineFileError::ExecutableDir(exe.display().to_string()))?;
        Ok(dir.join(ROUTINES_FILE_NAME))
    }

    /// Load definitions from a file, choosing the format by extension
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| RoutineFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let book = if is_toml {
            Self::from_toml_str(&contents)?
        } else {
            Self::from_json_str(&contents)?
        };

        if book.is_empty() {
            return Err(RoutineFileError::Empty(path.to_path_buf()).into());
        }
        Ok(book)
    }

    pub fn from_json_str(contents: &str) -> std::result::Result<Self, RoutineFileError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn from_toml_str(contents: &str) -> std::result::Result<Self, RoutineFileError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, routine: Routine) {
        self.routines.insert(name.into(), routine);
    }

    pub fn get(&self, name: &str) -> Option<&Routine> {
        self.routines.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routines.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    /// Look up every requested name, failing on the first unknown one.
    ///
    /// Names keep their requested order; a name given twice runs twice.
    pub fn resolve<'a, S: AsRef<str>>(
        &'a self,
        names: &'a [S],
    ) -> Result<Vec<(&'a str, &'a Routine)>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name)
                    .map(|routine| (name, routine))
                    .ok_or_else(|| CopiaError::UnknownRoutine(name.to_string()))
            })
            .collect()
    }
}

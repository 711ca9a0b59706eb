/*!
 * Error types for Copia
 */

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, CopiaError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug)]
pub enum CopiaError {
    /// Declared source does not exist
    SourceNotFound(PathBuf),

    /// Declared destination does not exist
    DestinationNotFound(PathBuf),

    /// Declared destination exists but is not a directory
    DestinationNotDirectory(PathBuf),

    /// Source path has no final component to name its output after
    UnnamedSource(PathBuf),

    /// Transfer requested on a manager whose current paths were never validated
    PathsNotValidated,

    /// Output entry already present in a destination
    DestinationExists(PathBuf),

    /// I/O failure while transferring a specific path
    Transfer { path: PathBuf, source: io::Error },

    /// Archive could not be written
    Archive { path: PathBuf, message: String },

    /// Metadata could not be carried over to a copy
    MetadataFailed(String),

    /// I/O error without path context
    Io(io::Error),

    /// Configuration error (routine definitions, command line)
    Config(String),

    /// Requested routine is not defined
    UnknownRoutine(String),
}

impl CopiaError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => EXIT_FATAL,
            ErrorCategory::Path | ErrorCategory::Transfer => EXIT_PARTIAL,
        }
    }

    /// Check if this error ends the whole run rather than a single routine
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            CopiaError::SourceNotFound(_)
            | CopiaError::DestinationNotFound(_)
            | CopiaError::DestinationNotDirectory(_)
            | CopiaError::UnnamedSource(_) => ErrorCategory::Path,
            CopiaError::PathsNotValidated
            | CopiaError::DestinationExists(_)
            | CopiaError::Transfer { .. }
            | CopiaError::Archive { .. }
            | CopiaError::MetadataFailed(_)
            | CopiaError::Io(_) => ErrorCategory::Transfer,
            CopiaError::Config(_) | CopiaError::UnknownRoutine(_) => ErrorCategory::Configuration,
        }
    }

    /// Render this error followed by every underlying cause
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            rendered.push_str(": ");
            rendered.push_str(&err.to_string());
            cause = err.source();
        }
        rendered
    }

    /// Attach a path to an I/O error, recognising collisions
    pub(crate) fn at(path: &Path) -> impl FnOnce(io::Error) -> CopiaError + '_ {
        move |source| {
            if source.kind() == io::ErrorKind::AlreadyExists {
                CopiaError::DestinationExists(path.to_path_buf())
            } else {
                CopiaError::Transfer {
                    path: path.to_path_buf(),
                    source,
                }
            }
        }
    }
}

/// Error taxonomy used in log output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A declared source or destination failed its existence/type check
    Path,
    /// Copy or archive writing failed
    Transfer,
    /// Routine definitions or requested names are unusable
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Path => write!(f, "path"),
            ErrorCategory::Transfer => write!(f, "transfer"),
            ErrorCategory::Configuration => write!(f, "configuration"),
        }
    }
}

impl fmt::Display for CopiaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopiaError::SourceNotFound(path) => {
                write!(f, "following source path doesn't exist: {}", path.display())
            }
            CopiaError::DestinationNotFound(path) => {
                write!(f, "following destination path doesn't exist: {}", path.display())
            }
            CopiaError::DestinationNotDirectory(path) => write!(
                f,
                "following destination path is supposed to be a directory and it is not: {}",
                path.display()
            ),
            CopiaError::UnnamedSource(path) => {
                write!(f, "source path has no name to copy under: {}", path.display())
            }
            CopiaError::PathsNotValidated => {
                write!(f, "files can't be transferred because paths have not been checked")
            }
            CopiaError::DestinationExists(path) => {
                write!(f, "destination entry already exists: {}", path.display())
            }
            CopiaError::Transfer { path, .. } => {
                write!(f, "transfer failed for {}", path.display())
            }
            CopiaError::Archive { path, message } => {
                write!(f, "archive {} could not be written: {}", path.display(), message)
            }
            CopiaError::MetadataFailed(msg) => write!(f, "Metadata operation failed: {}", msg),
            CopiaError::Io(err) => write!(f, "I/O error: {}", err),
            CopiaError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CopiaError::UnknownRoutine(name) => write!(f, "routine not defined: {}", name),
        }
    }
}

impl std::error::Error for CopiaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CopiaError::Transfer { source, .. } => Some(source),
            CopiaError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CopiaError {
    fn from(err: io::Error) -> Self {
        CopiaError::Io(err)
    }
}

impl From<walkdir::Error> for CopiaError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf);
        match path {
            Some(path) => CopiaError::Transfer {
                path,
                source: err.into(),
            },
            None => CopiaError::Io(err.into()),
        }
    }
}

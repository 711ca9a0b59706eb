/*!
 * Metadata carried from a source entry to its copy (timestamps, permissions)
 */

use crate::error::{CopiaError, Result};
use filetime::{set_file_times, FileTime};
use std::fs::Metadata;
use std::path::Path;

/// Apply the source's permissions and access/modification times to `dest_path`
pub fn preserve_metadata(source_path: &Path, dest_path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(source_path).map_err(|e| {
        CopiaError::MetadataFailed(format!(
            "cannot read metadata of {}: {}",
            source_path.display(),
            e
        ))
    })?;
    apply_metadata(&metadata, dest_path)
}

/// Apply already-read source metadata to `dest_path`
pub fn apply_metadata(metadata: &Metadata, dest_path: &Path) -> Result<()> {
    // Permissions go last so a read-only mode cannot block the time update
    let accessed = FileTime::from_last_access_time(metadata);
    let modified = FileTime::from_last_modification_time(metadata);
    set_file_times(dest_path, accessed, modified).map_err(|e| {
        CopiaError::MetadataFailed(format!(
            "cannot set timestamps on {}: {}",
            dest_path.display(),
            e
        ))
    })?;

    std::fs::set_permissions(dest_path, metadata.permissions()).map_err(|e| {
        CopiaError::MetadataFailed(format!(
            "cannot set permissions on {}: {}",
            dest_path.display(),
            e
        ))
    })?;

    Ok(())
}

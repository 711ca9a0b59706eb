/*!
 * Copy mode: recursive directory copy and single-file copy with metadata
 */

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::events::EventSink;
use super::metadata::{apply_metadata, preserve_metadata};
use super::naming::{copy_target, TimestampPrefix};
use super::validation::ValidatedSource;
use super::{relative_to, PartialOutput, SourceTransfer};
use crate::error::{CopiaError, Result};

/// Copy one source into `destination/<prefix><name>`.
///
/// Returns `None` when the source is neither a file nor a directory; that is
/// reported to the sink and the caller moves on.
pub fn copy_source(
    source: &ValidatedSource,
    destination: &Path,
    prefix: &TimestampPrefix,
    sink: &dyn EventSink,
) -> Result<Option<SourceTransfer>> {
    let path = source.path();
    let target = copy_target(destination, source.name(), prefix);

    if path.is_dir() {
        let (files, bytes) = copy_tree(path, &target, sink)?;
        Ok(Some(SourceTransfer {
            output: target,
            files,
            bytes,
        }))
    } else if path.is_file() {
        let bytes = copy_file(path, &target)?;
        Ok(Some(SourceTransfer {
            output: target,
            files: 1,
            bytes,
        }))
    } else {
        sink.error(format_args!(
            "neither a folder nor a file - not copied: {}",
            path.display()
        ));
        Ok(None)
    }
}

/// Copy a file to a path that must not exist yet, keeping its metadata.
///
/// A partially written copy is removed on failure.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64> {
    let metadata = fs::metadata(source).map_err(CopiaError::at(source))?;
    let mut reader = File::open(source).map_err(CopiaError::at(source))?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(CopiaError::at(dest))?;

    let guard = PartialOutput::new(dest);
    let bytes = io::copy(&mut reader, &mut writer).map_err(CopiaError::at(dest))?;
    drop(writer);
    apply_metadata(&metadata, dest)?;
    guard.commit();

    Ok(bytes)
}

/// Recreate the tree rooted at `source_root` as `dest_root`.
///
/// `dest_root` must not exist: an existing entry is a collision, never a
/// merge. Directory metadata is applied after their contents are written.
/// Returns the number of files and bytes copied.
pub fn copy_tree(source_root: &Path, dest_root: &Path, sink: &dyn EventSink) -> Result<(u64, u64)> {
    let mut files = 0u64;
    let mut bytes = 0u64;
    let mut directories: Vec<(PathBuf, PathBuf)> = Vec::new();

    let walker = WalkDir::new(source_root)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        let relative = relative_to(source_root, entry.path())?;
        let target = if relative.as_os_str().is_empty() {
            dest_root.to_path_buf()
        } else {
            dest_root.join(relative)
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir(&target).map_err(CopiaError::at(&target))?;
            directories.push((entry.path().to_path_buf(), target));
        } else if file_type.is_file() {
            bytes += copy_file(entry.path(), &target)?;
            files += 1;
        } else {
            sink.error(format_args!(
                "neither a folder nor a file - not copied: {}",
                entry.path().display()
            ));
        }
    }

    // Pre-order walk: reversed, children come before their parents
    for (source_dir, target_dir) in directories.iter().rev() {
        preserve_metadata(source_dir, target_dir)?;
    }

    Ok((files, bytes))
}

/*!
 * Compress mode: one deflate zip archive per source
 */

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::events::EventSink;
use crate::core::naming::{archive_target, TimestampPrefix};
use crate::core::validation::ValidatedSource;
use crate::core::{relative_to, PartialOutput, SourceTransfer};
use crate::error::{CopiaError, Result};

/// Suffix of the in-progress archive next to its final name
const PARTIAL_SUFFIX: &str = ".partial";

/// Archive one source as `destination/<prefix><name>.zip`.
///
/// Directory sources contribute one entry per file, named relative to the
/// source root; empty directories produce no entries. A file source becomes a
/// single entry named after the file. Sources that are neither are reported
/// and produce no archive.
pub fn compress_source(
    source: &ValidatedSource,
    destination: &Path,
    prefix: &TimestampPrefix,
    sink: &dyn EventSink,
) -> Result<Option<SourceTransfer>> {
    let path = source.path();
    let archive_path = archive_target(destination, source.name(), prefix);

    let entries = if path.is_dir() {
        directory_entries(path)?
    } else if path.is_file() {
        vec![(path.to_path_buf(), source.name().to_string_lossy().into_owned())]
    } else {
        sink.error(format_args!(
            "neither a folder nor a file - not compressed: {}",
            path.display()
        ));
        return Ok(None);
    };

    let (files, bytes) = write_archive(&archive_path, &entries, sink)?;
    Ok(Some(SourceTransfer {
        output: archive_path,
        files,
        bytes,
    }))
}

/// Files under `root` paired with their archive entry names, in walk order
pub fn directory_entries(root: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry_name(relative_to(root, entry.path())?);
        entries.push((entry.into_path(), name));
    }
    Ok(entries)
}

/// Archive entry name: forward slashes on every platform
pub fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Write `entries` into a new archive at `archive_path`.
///
/// The archive is built under a `.partial` name and renamed into place once
/// finished; on any error the partial file is removed. An archive already at
/// `archive_path` is replaced.
pub fn write_archive(
    archive_path: &Path,
    entries: &[(PathBuf, String)],
    sink: &dyn EventSink,
) -> Result<(u64, u64)> {
    let partial_path = partial_path(archive_path);
    let file = File::create(&partial_path).map_err(CopiaError::at(&partial_path))?;
    let guard = PartialOutput::new(&partial_path);

    let mut zip = ZipWriter::new(BufWriter::new(file));
    let mut bytes = 0u64;

    for (source, name) in entries {
        sink.debug(format_args!(
            "        zipping {} as {}",
            source.display(),
            name
        ));
        bytes += add_entry(&mut zip, source, name, archive_path)?;
    }

    let mut writer = zip.finish().map_err(|e| archive_error(archive_path, e))?;
    writer.flush().map_err(CopiaError::at(&partial_path))?;
    drop(writer);

    std::fs::rename(&partial_path, archive_path).map_err(CopiaError::at(archive_path))?;
    guard.commit();

    sink.debug(format_args!(
        "archive {} written: {} entries, {} bytes read",
        archive_path.display(),
        entries.len(),
        bytes
    ));
    Ok((entries.len() as u64, bytes))
}

fn add_entry<W: Write + io::Seek>(
    zip: &mut ZipWriter<W>,
    source: &Path,
    name: &str,
    archive_path: &Path,
) -> Result<u64> {
    let metadata = std::fs::metadata(source).map_err(CopiaError::at(source))?;
    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.len() > u64::from(u32::MAX));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(metadata.permissions().mode());
    }

    zip.start_file(name, options)
        .map_err(|e| archive_error(archive_path, e))?;
    let mut reader = File::open(source).map_err(CopiaError::at(source))?;
    io::copy(&mut reader, zip).map_err(CopiaError::at(source))
}

fn partial_path(archive_path: &Path) -> PathBuf {
    let mut name = archive_path.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

fn archive_error(archive_path: &Path, err: zip::result::ZipError) -> CopiaError {
    CopiaError::Archive {
        path: archive_path.to_path_buf(),
        message: err.to_string(),
    }
}

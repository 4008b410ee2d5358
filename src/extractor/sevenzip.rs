use super::ExtractedEntry;
use super::copy::copy_entry;
use crate::error::{IoOp, RepackError, Result};
use crate::security::PathSanitizer;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Extract a 7z archive below `root` under the same traversal rules as Zip.
///
/// sevenz-rust drives the iteration, so per-entry failures are parked in
/// `failure` and the callback returns `Ok(false)` to stop early.
pub(super) fn extract(archive_path: &Path, root: &Path) -> Result<Vec<ExtractedEntry>> {
    let file = File::open(archive_path).map_err(RepackError::io(IoOp::Open, archive_path))?;

    let mut entries = Vec::new();
    let mut failure: Option<RepackError> = None;

    let outcome = sevenz_rust::decompress_with_extract_fn(file, root, |entry, reader, _| {
        if failure.is_some() {
            return Ok(false);
        }
        match write_entry(archive_path, root, entry.name(), entry.is_directory(), reader) {
            Ok(extracted) => {
                entries.push(extracted);
                Ok(true)
            }
            Err(err) => {
                failure = Some(err);
                Ok(false)
            }
        }
    });

    if let Some(err) = failure {
        return Err(err);
    }
    outcome.map_err(|e| RepackError::corrupt(archive_path, e))?;

    Ok(entries)
}

fn write_entry<R: Read + ?Sized>(
    archive_path: &Path,
    root: &Path,
    name: &str,
    is_dir: bool,
    reader: &mut R,
) -> Result<ExtractedEntry> {
    let target = PathSanitizer::resolve(root, name)?;

    if is_dir {
        fs::create_dir_all(&target.resolved)
            .map_err(RepackError::io(IoOp::Create, &target.resolved))?;
        log::debug!("[extract] dir  {}", target.relative);
        return Ok(ExtractedEntry::directory(target));
    }

    if let Some(parent) = target.resolved.parent() {
        fs::create_dir_all(parent).map_err(RepackError::io(IoOp::Create, parent))?;
    }

    let mut outfile = File::create(&target.resolved)
        .map_err(RepackError::io(IoOp::Create, &target.resolved))?;
    let written = copy_entry(
        archive_path,
        &target.relative,
        reader,
        &target.resolved,
        &mut outfile,
    )?;

    log::debug!("[extract] file {} ({} bytes)", target.relative, written);

    // 7z stores Windows attributes; Unix mode bits are not carried over
    Ok(ExtractedEntry::file(target, None))
}

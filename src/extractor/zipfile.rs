use super::ExtractedEntry;
use super::copy::copy_entry;
use crate::error::{IoOp, RepackError, Result};
use crate::security::PathSanitizer;
use std::fs::{self, File};
use std::path::Path;
use zip::ZipArchive;

/// Extract every entry of a Zip archive below `root`.
///
/// The first entry that resolves outside `root` aborts extraction; whatever
/// was written before it stays on disk for the caller to discard.
pub(super) fn extract(archive_path: &Path, root: &Path) -> Result<Vec<ExtractedEntry>> {
    let file = File::open(archive_path).map_err(RepackError::io(IoOp::Open, archive_path))?;
    let mut archive = ZipArchive::new(file).map_err(|e| RepackError::corrupt(archive_path, e))?;

    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| RepackError::corrupt(archive_path, e))?;

        let target = PathSanitizer::resolve(root, file.name())?;

        if file.is_dir() {
            fs::create_dir_all(&target.resolved)
                .map_err(RepackError::io(IoOp::Create, &target.resolved))?;
            log::debug!("[extract] dir  {}", target.relative);
            entries.push(ExtractedEntry::directory(target));
            continue;
        }

        if let Some(parent) = target.resolved.parent() {
            fs::create_dir_all(parent).map_err(RepackError::io(IoOp::Create, parent))?;
        }

        let mut outfile = File::create(&target.resolved)
            .map_err(RepackError::io(IoOp::Create, &target.resolved))?;

        copy_entry(
            archive_path,
            &target.relative,
            &mut file,
            &target.resolved,
            &mut outfile,
        )?;
        drop(outfile);

        let mode = file.unix_mode().map(|m| readable_mode(&target.relative, m));
        apply_mode(&target.resolved, mode)?;

        log::debug!("[extract] file {} ({} bytes)", target.relative, file.size());
        entries.push(ExtractedEntry::file(target, mode));
    }

    Ok(entries)
}

/// Permission bits from the stored mode, with owner-read always granted
fn readable_mode(relative: &str, stored: u32) -> u32 {
    let mode = stored & 0o777;
    if mode & 0o400 == 0 {
        log::warn!(
            "[extract] {} is stored with mode {:o}; granting owner read",
            relative,
            mode
        );
    }
    mode | 0o400
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
            .map_err(RepackError::io(IoOp::Write, path))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::readable_mode;

    #[test]
    fn test_readable_mode_floor() {
        assert_eq!(readable_mode("locked.dll", 0o000), 0o400);
        assert_eq!(readable_mode("run.sh", 0o100_755), 0o755);
        assert_eq!(readable_mode("data.bin", 0o640), 0o640);
    }
}

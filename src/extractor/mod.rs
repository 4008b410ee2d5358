mod copy;
mod entry;
mod kind;
mod sevenzip;
mod zipfile;

#[cfg(test)]
mod tests;

pub use entry::{ExtractedEntry, base_name, parent_dir, scan_tree};
pub use kind::ContainerKind;

use crate::error::{IoOp, RepackError, Result};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix appended to the archive's file name to form the scratch directory
pub const SCRATCH_SUFFIX: &str = ".temp_dir";

/// Raw extraction output, consumed by the classifier
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Absolute scratch directory holding the extracted tree
    pub scratch_root: PathBuf,
    /// Entries in archive order
    pub entries: Vec<ExtractedEntry>,
}

impl Extraction {
    /// Non-directory entries sorted by relative path
    pub fn files(&self) -> Vec<ExtractedEntry> {
        let mut files: Vec<_> = self.entries.iter().filter(|e| !e.is_dir).cloned().collect();
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        files
    }

    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_dir).count()
    }
}

/// Extracts archives into a scratch directory under a working directory
pub struct ArchiveExtractor {
    work_dir: PathBuf,
}

impl ArchiveExtractor {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// `<work_dir>/<archive file name>.temp_dir`
    pub fn scratch_root_for(&self, archive_path: &Path) -> Result<PathBuf> {
        let name = asset_file_name(archive_path)?;
        Ok(self.work_dir.join(format!("{}{}", name, SCRATCH_SUFFIX)))
    }

    /// Extract `archive_path` into a freshly created scratch directory.
    ///
    /// A stale scratch directory of the same name is removed first. On error,
    /// partially extracted output is left in place.
    pub fn extract(&self, archive_path: &Path, kind: ContainerKind) -> Result<Extraction> {
        let scratch = self.scratch_root_for(archive_path)?;
        remove_dir_if_present(&scratch)?;
        fs::create_dir_all(&scratch).map_err(RepackError::io(IoOp::Create, &scratch))?;

        // Traversal checks compare against the canonical root
        let scratch_root =
            fs::canonicalize(&scratch).map_err(RepackError::io(IoOp::Open, &scratch))?;

        log::info!(
            "Extracting {} ({}) into {}",
            archive_path.display(),
            kind,
            scratch_root.display()
        );

        let entries = match kind {
            ContainerKind::Zip => zipfile::extract(archive_path, &scratch_root)?,
            ContainerKind::SevenZip => sevenzip::extract(archive_path, &scratch_root)?,
        };
        let entries = dedupe_entries(entries);

        let extraction = Extraction {
            scratch_root,
            entries,
        };
        log::info!(
            "Extracted {} entries ({} files)",
            extraction.entries.len(),
            extraction.file_count()
        );

        Ok(extraction)
    }
}

/// Collapse entries whose stored names resolved to the same scratch path
/// (`sub/a.dll` and `sub\a.dll`). The later entry is what sits on disk, so
/// it replaces the earlier one in place.
fn dedupe_entries(entries: Vec<ExtractedEntry>) -> Vec<ExtractedEntry> {
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(entries.len());
    let mut unique: Vec<ExtractedEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        match seen.get(&entry.relative_path) {
            Some(&index) => {
                log::debug!("[extract] {} stored more than once", entry.relative_path);
                unique[index] = entry;
            }
            None => {
                seen.insert(entry.relative_path.clone(), unique.len());
                unique.push(entry);
            }
        }
    }

    unique
}

/// File name component of an archive path, used to name derived directories
pub fn asset_file_name(archive_path: &Path) -> Result<String> {
    archive_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| RepackError::Io {
            op: IoOp::Open,
            path: archive_path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "archive path has no file name"),
        })
}

/// Remove a directory tree if it exists; a missing directory is not an error
pub fn remove_dir_if_present(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(path).map_err(RepackError::io(IoOp::Remove, path))
        }
        Ok(_) => fs::remove_file(path).map_err(RepackError::io(IoOp::Remove, path)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RepackError::Io {
            op: IoOp::Remove,
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

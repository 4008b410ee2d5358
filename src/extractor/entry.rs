use crate::error::{IoOp, RepackError, Result};
use crate::security::{PathSanitizer, SanitizedPath};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file or directory produced by extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntry {
    /// Forward-slash path relative to the scratch root (e.g. "BepInEx/MyMod.dll")
    pub relative_path: String,
    /// Absolute location on disk
    pub disk_path: PathBuf,
    pub is_dir: bool,
    /// Unix mode bits as stored in the archive, when the format carries them
    pub mode: Option<u32>,
}

impl ExtractedEntry {
    pub fn file(path: SanitizedPath, mode: Option<u32>) -> Self {
        Self {
            relative_path: path.relative,
            disk_path: path.resolved,
            is_dir: false,
            mode,
        }
    }

    pub fn directory(path: SanitizedPath) -> Self {
        Self {
            relative_path: path.relative,
            disk_path: path.resolved,
            is_dir: true,
            mode: None,
        }
    }

    /// Final path segment, independent of separator style
    pub fn base_name(&self) -> &str {
        base_name(&self.relative_path)
    }
}

/// Final segment of a `/`- or `\`-separated path
pub fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Directory part of a `/`- or `\`-separated path ("" for a bare name)
pub fn parent_dir(path: &str) -> &str {
    let name = base_name(path);
    path[..path.len() - name.len()].trim_end_matches(['/', '\\'])
}

/// List every entry below an already extracted tree, sorted by relative path
pub fn scan_tree(root: &Path) -> Result<Vec<ExtractedEntry>> {
    let mut entries = Vec::new();

    for item in WalkDir::new(root).min_depth(1).follow_links(false).sort_by_file_name() {
        let item = item.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            RepackError::Io {
                op: IoOp::Read,
                path,
                source: io::Error::from(e),
            }
        })?;

        let relative = item
            .path()
            .strip_prefix(root)
            .map(PathSanitizer::to_virtual)
            .unwrap_or_default();

        entries.push(ExtractedEntry {
            relative_path: relative,
            disk_path: item.path().to_path_buf(),
            is_dir: item.file_type().is_dir(),
            mode: file_mode(item.path()),
        });
    }

    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(entries)
}

#[cfg(unix)]
fn file_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::symlink_metadata(path)
        .ok()
        .map(|m| m.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> Option<u32> {
    None
}

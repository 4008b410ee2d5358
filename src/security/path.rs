use crate::error::{RepackError, Result};
use std::path::{Component, Path, PathBuf};

/// An archive entry name resolved against the scratch root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedPath {
    /// Absolute destination on disk, always below the scratch root
    pub resolved: PathBuf,
    /// Forward-slash path relative to the scratch root (e.g. "plugins/a.dll")
    pub relative: String,
}

pub struct PathSanitizer;

impl PathSanitizer {
    /// Resolve a stored archive entry name against `root` to prevent:
    /// - Directory traversal (../)
    /// - Absolute paths (/etc/passwd, C:\Windows)
    /// - Zip slip attacks
    ///
    /// Backslashes are treated as separators so Windows-authored archives
    /// are checked the same way. `root` must already be absolute and clean.
    /// The resolved path must lie strictly below `root`; anything else is a
    /// `PathTraversalViolation`.
    pub fn resolve(root: &Path, raw_name: &str) -> Result<SanitizedPath> {
        let normalized = raw_name.replace('\\', "/");
        let resolved = Self::clean(&root.join(&normalized));

        if resolved == root || !resolved.starts_with(root) {
            return Err(RepackError::PathTraversalViolation {
                entry: raw_name.to_string(),
                resolved,
            });
        }

        let relative = resolved
            .strip_prefix(root)
            .map(Self::to_virtual)
            .unwrap_or_default();

        Ok(SanitizedPath { resolved, relative })
    }

    /// Lexically clean a path: drop `.`, fold `..` into its parent
    pub fn clean(path: &Path) -> PathBuf {
        let mut result = PathBuf::new();

        for component in path.components() {
            match component {
                Component::ParentDir => {
                    result.pop();
                }
                Component::CurDir => continue,
                Component::Normal(part) => result.push(part),
                Component::RootDir | Component::Prefix(_) => result.push(component.as_os_str()),
            }
        }

        result
    }

    /// Join the components of a relative path with forward slashes
    pub fn to_virtual(path: &Path) -> String {
        path.components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

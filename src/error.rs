use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filesystem operation that failed, used to label `RepackError::Io`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Create,
    Open,
    Read,
    Write,
    Copy,
    Remove,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            IoOp::Create => "create",
            IoOp::Open => "open",
            IoOp::Read => "read",
            IoOp::Write => "write",
            IoOp::Copy => "copy",
            IoOp::Remove => "remove",
        };
        f.write_str(verb)
    }
}

#[derive(Error, Debug)]
pub enum RepackError {
    #[error("Archive is unreadable or corrupt: {path}: {reason}")]
    ArchiveCorrupt { path: PathBuf, reason: String },

    #[error("Unsupported container format: {0}")]
    UnsupportedContainerFormat(PathBuf),

    #[error("Archive entry escapes the scratch directory: '{entry}' resolves to '{resolved}'")]
    PathTraversalViolation { entry: String, resolved: PathBuf },

    #[error("Failed to {op} '{path}': {source}")]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Destination parent directory does not exist: {0}")]
    MissingDestinationParent(PathBuf),

    #[error("Base name collision at '{destination}': '{first}' and '{second}'")]
    NameCollision {
        first: PathBuf,
        second: PathBuf,
        destination: PathBuf,
    },

    #[error("Workspace is in use by another run (lock file: {0})")]
    WorkspaceBusy(PathBuf),

    #[error("Invalid package metadata: {0}")]
    InvalidMetadata(String),

    #[error("Unable to find dependency string for {0}")]
    UnresolvedDependency(String),

    #[error("Failed to parse JSON from '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl RepackError {
    /// Adapter for `map_err` that tags an I/O error with its operation and path
    pub(crate) fn io(op: IoOp, path: impl AsRef<Path>) -> impl FnOnce(io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| RepackError::Io { op, path, source }
    }

    pub(crate) fn corrupt(path: impl AsRef<Path>, reason: impl fmt::Display) -> Self {
        RepackError::ArchiveCorrupt {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RepackError>;

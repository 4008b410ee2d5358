// Public API exports
pub mod builder;
pub mod classifier;
pub mod error;
pub mod extractor;
pub mod manifest;
pub mod packager;
pub mod pipeline;
pub mod security;
pub mod workspace;

#[cfg(test)]
mod test_utils;

// Re-export main types for convenience
pub use error::{IoOp, RepackError, Result};
pub use security::{PathSanitizer, SanitizedPath};

pub use extractor::{ArchiveExtractor, ContainerKind, ExtractedEntry, Extraction, scan_tree};

pub use classifier::{Category, ClassificationResult, FileClassifier, LoaderFlags};

pub use builder::{BuildReport, CollisionPolicy, DirectoryBuilder};

pub use manifest::{DependencyResolver, PackageIndex, PackageMetadata, ThunderstoreManifest};

pub use packager::{PackageReport, Packager};

pub use pipeline::{Pipeline, RepackOptions, RepackReport};
pub use workspace::WorkspaceLock;

mod result;
mod rules;


pub use result::{Category, ClassificationResult, LoaderFlags};
pub use rules::{Candidate, FALLBACK, FsSiblings, RULES, Rule, SiblingLookup};

use crate::error::{IoOp, RepackError, Result};
use crate::extractor::{ExtractedEntry, base_name, parent_dir};
use std::path::{Path, PathBuf};

/// Assigns each extracted file to exactly one loader category
pub struct FileClassifier<L: SiblingLookup> {
    siblings: L,
}

impl FileClassifier<FsSiblings> {
    /// Classifier that probes siblings inside an extracted tree
    pub fn for_scratch_root(root: impl Into<PathBuf>) -> Self {
        Self::new(FsSiblings::new(root))
    }
}

impl<L: SiblingLookup> FileClassifier<L> {
    pub fn new(siblings: L) -> Self {
        Self { siblings }
    }

    /// Category for a single relative path
    ///
    /// Only the base name and, for paired manifests, the contents of the
    /// file's own directory are consulted.
    pub fn categorize(&self, relative_path: &str) -> Result<Category> {
        let name = base_name(relative_path);
        let directory = parent_dir(relative_path);
        let candidate = Candidate::new(name, directory);

        for rule in RULES {
            let matched = rule
                .matches(&candidate, &self.siblings)
                .map_err(|source| RepackError::Io {
                    op: IoOp::Read,
                    path: Path::new(directory).join(name),
                    source,
                })?;
            if matched {
                log::trace!(
                    "[classify] {} -> {} ({})",
                    relative_path,
                    rule.category,
                    rule.name
                );
                return Ok(rule.category);
            }
        }

        log::trace!("[classify] {} -> {} (fallback)", relative_path, FALLBACK);
        Ok(FALLBACK)
    }

    /// Classify every non-directory entry, keeping input order within each category
    pub fn classify(&self, entries: &[ExtractedEntry]) -> Result<ClassificationResult> {
        let mut result = ClassificationResult::new();

        for entry in entries.iter().filter(|e| !e.is_dir) {
            let category = self.categorize(&entry.relative_path)?;
            log::debug!("[classify] {} -> {}", entry.relative_path, category);
            result.push(category, entry.clone());
        }

        let flags = result.flags();
        log::info!(
            "Classified {} files (sideloader: {}, deli: {}, lvo: {})",
            result.len(),
            flags.sideloader,
            flags.deli,
            flags.lvo
        );

        Ok(result)
    }
}

mod layout;


pub use layout::{LAYOUT, destination};

use crate::classifier::{Category, ClassificationResult};
use crate::error::{IoOp, RepackError, Result};
use crate::extractor::remove_dir_if_present;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Suffix appended to the archive's file name to form the build root
pub const BUILD_SUFFIX: &str = "._build";

/// What to do when two files flatten onto the same destination name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Fail the build with `NameCollision`
    #[default]
    Reject,
    /// Later files replace earlier ones
    Overwrite,
}

/// A single planned copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub category: Category,
    pub source: PathBuf,
    /// Relative to the build root
    pub destination: PathBuf,
}

/// Outcome of populating a build root
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub build_root: PathBuf,
    /// Folders created, relative to the build root, in creation order
    pub folders: Vec<PathBuf>,
    /// Files written, relative to the build root, in copy order
    pub files: Vec<PathBuf>,
}

/// Lays classified files out under a fresh build root
pub struct DirectoryBuilder {
    build_root: PathBuf,
    collision_policy: CollisionPolicy,
}

impl DirectoryBuilder {
    pub fn new(build_root: impl Into<PathBuf>) -> Self {
        Self {
            build_root: build_root.into(),
            collision_policy: CollisionPolicy::default(),
        }
    }

    /// Set the base-name collision policy
    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Wipe the build root and recreate it empty
    pub fn prepare(&self) -> Result<()> {
        if let Some(parent) = self.build_root.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(RepackError::MissingDestinationParent(parent.to_path_buf()));
            }
        }

        remove_dir_if_present(&self.build_root)?;
        fs::create_dir(&self.build_root).map_err(RepackError::io(IoOp::Create, &self.build_root))
    }

    /// Map every classified file to its flattened destination.
    ///
    /// Collisions are detected here, before anything is copied.
    pub fn plan(&self, classification: &ClassificationResult) -> Result<Vec<Placement>> {
        let mut placements: Vec<Placement> = Vec::with_capacity(classification.len());
        let mut claimed: HashMap<PathBuf, usize> = HashMap::new();

        for (category, _) in LAYOUT {
            let folder = destination(category);
            for entry in classification.files(category) {
                let placement = Placement {
                    category,
                    source: entry.disk_path.clone(),
                    destination: folder.join(entry.base_name()),
                };

                match claimed.get(&placement.destination) {
                    Some(&index) => match self.collision_policy {
                        CollisionPolicy::Reject => {
                            return Err(RepackError::NameCollision {
                                first: placements[index].source.clone(),
                                second: placement.source,
                                destination: placement.destination,
                            });
                        }
                        CollisionPolicy::Overwrite => {
                            log::warn!(
                                "{} overwrites {} at {}",
                                placement.source.display(),
                                placements[index].source.display(),
                                placement.destination.display()
                            );
                            placements[index] = placement;
                        }
                    },
                    None => {
                        claimed.insert(placement.destination.clone(), placements.len());
                        placements.push(placement);
                    }
                }
            }
        }

        Ok(placements)
    }

    /// Recreate the build root and copy every classified file into it
    pub fn build(&self, classification: &ClassificationResult) -> Result<BuildReport> {
        self.prepare()?;
        let placements = self.plan(classification)?;

        let mut report = BuildReport {
            build_root: self.build_root.clone(),
            folders: Vec::new(),
            files: Vec::with_capacity(placements.len()),
        };

        for (category, _) in LAYOUT {
            let folder = destination(category);
            let mut batch = placements.iter().filter(|p| p.category == category).peekable();
            if batch.peek().is_none() {
                continue;
            }

            let folder_path = self.build_root.join(&folder);
            fs::create_dir_all(&folder_path).map_err(RepackError::io(IoOp::Create, &folder_path))?;
            report.folders.push(folder);

            for placement in batch {
                let target = self.build_root.join(&placement.destination);
                fs::copy(&placement.source, &target).map_err(RepackError::io(IoOp::Copy, &target))?;
                log::debug!(
                    "[build] {} -> {}",
                    placement.source.display(),
                    placement.destination.display()
                );
                report.files.push(placement.destination.clone());
            }
        }

        log::info!(
            "Built {} with {} files in {} folders",
            self.build_root.display(),
            report.files.len(),
            report.folders.len()
        );

        Ok(report)
    }
}

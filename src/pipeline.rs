use crate::builder::{BUILD_SUFFIX, CollisionPolicy, DirectoryBuilder};
use crate::classifier::{Category, FileClassifier, LoaderFlags};
use crate::error::{RepackError, Result};
use crate::extractor::{ArchiveExtractor, ContainerKind, asset_file_name, remove_dir_if_present};
use crate::manifest::{DependencyResolver, PackageIndex, PackageMetadata, ThunderstoreManifest};
use crate::packager::{PackageReport, Packager};
use crate::workspace::WorkspaceLock;
use std::path::{Path, PathBuf};

/// Settings for a repack run
pub struct RepackOptions {
    work_dir: PathBuf,
    collision_policy: CollisionPolicy,
    keep_scratch_on_failure: bool,
    metadata: Option<PackageMetadata>,
    resolver: Box<dyn DependencyResolver>,
    pack: bool,
}

impl RepackOptions {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            collision_policy: CollisionPolicy::default(),
            keep_scratch_on_failure: false,
            metadata: None,
            resolver: Box::new(PackageIndex::default()),
            pack: false,
        }
    }

    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Leave the scratch directory behind when a run fails
    pub fn keep_scratch_on_failure(mut self, keep: bool) -> Self {
        self.keep_scratch_on_failure = keep;
        self
    }

    /// Write `manifest.json` and `README.md` into the build root
    pub fn metadata(mut self, metadata: PackageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn package_index(self, index: PackageIndex) -> Self {
        self.resolver(index)
    }

    pub fn resolver(mut self, resolver: impl DependencyResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Zip the build root into `<packageName>-<version>.zip`; needs metadata
    pub fn pack(mut self, pack: bool) -> Self {
        self.pack = pack;
        self
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RepackReport {
    pub archive: PathBuf,
    pub kind: ContainerKind,
    pub build_root: PathBuf,
    pub counts: Vec<(Category, usize)>,
    pub flags: LoaderFlags,
    /// Files placed by the builder, relative to the build root
    pub files: Vec<PathBuf>,
    pub manifest: Option<ThunderstoreManifest>,
    pub package: Option<PackageReport>,
}

/// Extract, classify, build and optionally package one archive
pub struct Pipeline {
    options: RepackOptions,
}

impl Pipeline {
    pub fn new(options: RepackOptions) -> Self {
        Self { options }
    }

    /// `<work_dir>/<archive file name>._build`
    pub fn build_root_for(&self, archive_path: &Path) -> Result<PathBuf> {
        let name = asset_file_name(archive_path)?;
        Ok(self.options.work_dir.join(format!("{}{}", name, BUILD_SUFFIX)))
    }

    pub fn run(&self, archive_path: &Path, kind: ContainerKind) -> Result<RepackReport> {
        let work_dir = &self.options.work_dir;
        if !work_dir.is_dir() {
            return Err(RepackError::MissingDestinationParent(work_dir.clone()));
        }
        if let Some(metadata) = &self.options.metadata {
            metadata.validate()?;
        } else if self.options.pack {
            return Err(RepackError::InvalidMetadata(
                "packaging needs a package name and version".to_string(),
            ));
        }

        let lock = WorkspaceLock::acquire(work_dir, archive_path)?;
        let extractor = ArchiveExtractor::new(work_dir);
        let scratch = extractor.scratch_root_for(archive_path)?;

        let result = self.run_stages(&extractor, archive_path, kind);
        if result.is_err() {
            if self.options.keep_scratch_on_failure {
                log::warn!("Keeping scratch directory {}", scratch.display());
            } else if let Err(e) = remove_dir_if_present(&scratch) {
                log::warn!("Failed to clean up {}: {}", scratch.display(), e);
            }
        }

        let released = lock.release();
        let report = result?;
        released?;
        Ok(report)
    }

    fn run_stages(
        &self,
        extractor: &ArchiveExtractor,
        archive_path: &Path,
        kind: ContainerKind,
    ) -> Result<RepackReport> {
        let extraction = extractor.extract(archive_path, kind)?;
        let classification = FileClassifier::for_scratch_root(&extraction.scratch_root)
            .classify(&extraction.files())?;

        let build_root = self.build_root_for(archive_path)?;
        let built = DirectoryBuilder::new(&build_root)
            .collision_policy(self.options.collision_policy)
            .build(&classification)?;

        remove_dir_if_present(&extraction.scratch_root)?;
        log::debug!("Removed scratch directory {}", extraction.scratch_root.display());

        let flags = classification.flags();
        let mut report = RepackReport {
            archive: archive_path.to_path_buf(),
            kind,
            build_root,
            counts: classification.counts(),
            flags,
            files: built.files,
            manifest: None,
            package: None,
        };

        if let Some(metadata) = &self.options.metadata {
            let resolver = self.options.resolver.as_ref();
            let manifest = ThunderstoreManifest::from_metadata(metadata, flags, resolver)?;
            manifest.write_to_folder(&report.build_root, &metadata.readme_markdown())?;

            if self.options.pack {
                let output = self.options.work_dir.join(metadata.package_file_name()?);
                report.package = Some(Packager::new(&report.build_root).write_to_file(&output)?);
            }
            report.manifest = Some(manifest);
        }

        log::info!(
            "Repacked {} into {} ({} files)",
            archive_path.display(),
            report.build_root.display(),
            report.files.len()
        );

        Ok(report)
    }
}

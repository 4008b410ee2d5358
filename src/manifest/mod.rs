mod index;
mod name;


pub use index::{DependencyResolver, PackageIndex, PackageListing, PackageVersion};
pub use name::{MAX_DESCRIPTION_LEN, package_name, validate_description, validate_version};

use crate::classifier::LoaderFlags;
use crate::error::{IoOp, RepackError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const OTHERLOADER: &str = "devyndamonster-OtherLoader";
pub const SIDELOADER: &str = "denikson-H3VR_Sideloader";
pub const DELI: &str = "DeliCollective-Deli";

pub const MANIFEST_FILE: &str = "manifest.json";
pub const README_FILE: &str = "README.md";

/// User-supplied description of the package being produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Display name; the package name is derived from it
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website_url: String,
    /// Markdown body placed under the title in README.md
    #[serde(default)]
    pub readme: String,
    #[serde(default)]
    pub changelog: Option<String>,
    /// Depend on OtherLoader even when no legacy virtual objects were found
    #[serde(default)]
    pub require_otherloader: bool,
    /// Additional package ids ("owner-name") to depend on
    #[serde(default)]
    pub extra_dependencies: Vec<String>,
}

impl PackageMetadata {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(RepackError::io(IoOp::Read, path))?;
        serde_json::from_str(&json).map_err(|source| RepackError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every field the registry constrains
    pub fn validate(&self) -> Result<()> {
        package_name(&self.name)?;
        validate_version(&self.version)?;
        validate_description(&self.description)
    }

    pub fn package_name(&self) -> Result<String> {
        package_name(&self.name)
    }

    /// `<packageName>-<version>.zip`
    pub fn package_file_name(&self) -> Result<String> {
        Ok(format!("{}-{}.zip", self.package_name()?, self.version))
    }

    pub fn readme_markdown(&self) -> String {
        let mut readme = format!("# {}\n\n{}", self.name.trim(), self.readme);
        if let Some(changelog) = self.changelog.as_deref().filter(|c| !c.trim().is_empty()) {
            readme.push_str("\n\n## Changelog\n\n");
            readme.push_str(changelog);
        }
        readme
    }

    /// Package ids this package depends on, in manifest order
    pub fn required_packages(&self, flags: LoaderFlags) -> Vec<String> {
        let mut packages: Vec<String> = Vec::new();
        let loaders = [
            (flags.lvo || self.require_otherloader, OTHERLOADER),
            (flags.sideloader, SIDELOADER),
            (flags.deli, DELI),
        ];

        for (needed, package) in loaders {
            if needed {
                packages.push(package.to_string());
            }
        }
        for extra in &self.extra_dependencies {
            let extra = extra.trim();
            if !extra.is_empty() && !packages.iter().any(|p| p == extra) {
                packages.push(extra.to_string());
            }
        }

        packages
    }
}

/// The registry's `manifest.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThunderstoreManifest {
    pub name: String,
    pub version_number: String,
    pub description: String,
    pub website_url: String,
    pub dependencies: Vec<String>,
}

impl ThunderstoreManifest {
    /// Build a validated manifest, resolving one dependency per required package
    pub fn from_metadata(
        metadata: &PackageMetadata,
        flags: LoaderFlags,
        resolver: &dyn DependencyResolver,
    ) -> Result<Self> {
        metadata.validate()?;

        let dependencies = metadata
            .required_packages(flags)
            .iter()
            .map(|package| resolver.dependency_string(package))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: metadata.package_name()?,
            version_number: metadata.version.clone(),
            description: metadata.description.clone(),
            website_url: metadata.website_url.clone(),
            dependencies,
        })
    }

    /// Tab-indented JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write `manifest.json` and `README.md` into `dir`
    pub fn write_to_folder(&self, dir: &Path, readme: &str) -> Result<Vec<PathBuf>> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let json = self.to_json().map_err(|source| RepackError::Json {
            path: manifest_path.clone(),
            source,
        })?;
        fs::write(&manifest_path, json).map_err(RepackError::io(IoOp::Write, &manifest_path))?;

        let readme_path = dir.join(README_FILE);
        fs::write(&readme_path, readme).map_err(RepackError::io(IoOp::Write, &readme_path))?;

        log::info!(
            "Wrote {} for {} {} ({} dependencies)",
            manifest_path.display(),
            self.name,
            self.version_number,
            self.dependencies.len()
        );

        Ok(vec![manifest_path, readme_path])
    }
}

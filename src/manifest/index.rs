use crate::error::{IoOp, RepackError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Turns a package id ("owner-name") into a versioned dependency string
/// ("owner-name-1.2.3")
pub trait DependencyResolver {
    fn dependency_string(&self, package: &str) -> Result<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageVersion {
    pub full_name: String,
}

/// One package as it appears in the registry listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageListing {
    pub full_name: String,
    #[serde(default)]
    pub versions: Vec<PackageVersion>,
}

/// Resolver backed by a saved registry listing.
///
/// The registry lists versions newest first, so the first version of a
/// package is taken as its latest.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    latest: HashMap<String, String>,
}

impl PackageIndex {
    pub fn from_listings(listings: impl IntoIterator<Item = PackageListing>) -> Self {
        let mut latest = HashMap::new();
        for listing in listings {
            if let Some(version) = listing.versions.into_iter().next() {
                latest.entry(listing.full_name).or_insert(version.full_name);
            }
        }
        Self { latest }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let listings: Vec<PackageListing> = serde_json::from_str(json)?;
        Ok(Self::from_listings(listings))
    }

    /// Load a listing previously saved from the registry API
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(RepackError::io(IoOp::Read, path))?;
        let index = Self::from_json(&json).map_err(|source| RepackError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded {} packages from {}", index.len(), path.display());
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

impl DependencyResolver for PackageIndex {
    fn dependency_string(&self, package: &str) -> Result<String> {
        self.latest
            .get(package)
            .cloned()
            .ok_or_else(|| RepackError::UnresolvedDependency(package.to_string()))
    }
}

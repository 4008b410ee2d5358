use super::Category;
use std::fs;
use std::io;
use std::path::PathBuf;

const MANIFEST_SUFFIX: &str = ".manifest";

/// What a rule gets to look at: the base name and the directory holding it
pub struct Candidate<'a> {
    /// Final path segment as stored
    pub base_name: &'a str,
    /// Relative directory of the file ("" at the scratch root)
    pub directory: &'a str,
}

impl<'a> Candidate<'a> {
    pub fn new(base_name: &'a str, directory: &'a str) -> Self {
        Self {
            base_name,
            directory,
        }
    }

    fn has_suffix(&self, suffix: &str) -> bool {
        strip_suffix_ignore_case(self.base_name, suffix).is_some()
    }
}

/// Case-insensitive (ASCII) `strip_suffix`
fn strip_suffix_ignore_case<'s>(name: &'s str, suffix: &str) -> Option<&'s str> {
    let split = name.len().checked_sub(suffix.len())?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = name.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Answers "does a regular file with this name sit in that directory?"
pub trait SiblingLookup {
    /// `Ok(false)` only when the sibling is absent; other failures are errors
    fn file_exists(&self, directory: &str, name: &str) -> io::Result<bool>;
}

/// Sibling lookup against the extracted tree on disk
pub struct FsSiblings {
    root: PathBuf,
}

impl FsSiblings {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SiblingLookup for FsSiblings {
    fn file_exists(&self, directory: &str, name: &str) -> io::Result<bool> {
        let path = self.root.join(directory).join(name);
        match fs::symlink_metadata(&path) {
            Ok(meta) => Ok(meta.file_type().is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

type Predicate = fn(&Candidate<'_>, &dyn SiblingLookup) -> io::Result<bool>;

/// One entry of the ordered rule table
pub struct Rule {
    pub name: &'static str,
    pub category: Category,
    predicate: Predicate,
}

impl Rule {
    pub fn matches(
        &self,
        candidate: &Candidate<'_>,
        siblings: &dyn SiblingLookup,
    ) -> io::Result<bool> {
        (self.predicate)(candidate, siblings)
    }
}

/// Evaluated top to bottom; the first match wins
pub const RULES: &[Rule] = &[
    Rule {
        name: "sideloader-package",
        category: Category::SideloaderMod,
        predicate: sideloader_package,
    },
    Rule {
        name: "plugin-assembly",
        category: Category::PluginBinary,
        predicate: plugin_assembly,
    },
    Rule {
        name: "deli-package",
        category: Category::DeliMod,
        predicate: deli_package,
    },
    Rule {
        name: "extensionless-asset-bundle",
        category: Category::LegacyVirtualObject,
        predicate: extensionless,
    },
    Rule {
        name: "paired-manifest",
        category: Category::LegacyVirtualObject,
        predicate: paired_manifest,
    },
];

/// Category for files no rule claims
pub const FALLBACK: Category = Category::PluginBinary;

fn sideloader_package(candidate: &Candidate<'_>, _: &dyn SiblingLookup) -> io::Result<bool> {
    Ok(candidate.has_suffix(".hotmod") || candidate.has_suffix(".h3mod"))
}

fn plugin_assembly(candidate: &Candidate<'_>, _: &dyn SiblingLookup) -> io::Result<bool> {
    Ok(candidate.has_suffix(".dll"))
}

fn deli_package(candidate: &Candidate<'_>, _: &dyn SiblingLookup) -> io::Result<bool> {
    Ok(candidate.has_suffix(".deli"))
}

fn extensionless(candidate: &Candidate<'_>, _: &dyn SiblingLookup) -> io::Result<bool> {
    Ok(!candidate.base_name.contains('.'))
}

/// `<name>.manifest` whose `<name>` sits next to it
fn paired_manifest(candidate: &Candidate<'_>, siblings: &dyn SiblingLookup) -> io::Result<bool> {
    match strip_suffix_ignore_case(candidate.base_name, MANIFEST_SUFFIX) {
        Some(companion) if !companion.is_empty() => {
            siblings.file_exists(candidate.directory, companion)
        }
        _ => Ok(false),
    }
}

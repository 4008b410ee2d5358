use crate::extractor::ExtractedEntry;
use serde::Serialize;
use std::fmt;

/// Loader subsystem a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    /// `.hotmod` / `.h3mod` packages
    SideloaderMod,
    /// Plugin assemblies and everything without a more specific home
    PluginBinary,
    /// `.deli` packages
    DeliMod,
    /// Extensionless asset bundles and their paired `.manifest` sidecars
    LegacyVirtualObject,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::SideloaderMod,
        Category::PluginBinary,
        Category::DeliMod,
        Category::LegacyVirtualObject,
    ];

    fn index(self) -> usize {
        match self {
            Category::SideloaderMod => 0,
            Category::PluginBinary => 1,
            Category::DeliMod => 2,
            Category::LegacyVirtualObject => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::SideloaderMod => "Sideloader mod",
            Category::PluginBinary => "plugin binary",
            Category::DeliMod => "Deli mod",
            Category::LegacyVirtualObject => "LVO",
        };
        f.write_str(label)
    }
}

/// Which loaders the package needs, derived from non-empty categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoaderFlags {
    pub sideloader: bool,
    pub deli: bool,
    pub lvo: bool,
}

/// Files grouped by category, each group in insertion order
#[derive(Debug, Clone, Default)]
pub struct ClassificationResult {
    groups: [Vec<ExtractedEntry>; 4],
}

impl ClassificationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: Category, entry: ExtractedEntry) {
        self.groups[category.index()].push(entry);
    }

    /// Files assigned to `category`
    pub fn files(&self, category: Category) -> &[ExtractedEntry] {
        &self.groups[category.index()]
    }

    /// Category of a classified file, looked up by relative path
    pub fn category_of(&self, relative_path: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| {
            self.files(*c)
                .iter()
                .any(|e| e.relative_path == relative_path)
        })
    }

    /// Every classified file with its category, grouped in `Category::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &ExtractedEntry)> {
        Category::ALL
            .into_iter()
            .flat_map(move |c| self.files(c).iter().map(move |e| (c, e)))
    }

    /// (category, file count) for every category, including empty ones
    pub fn counts(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .into_iter()
            .map(|c| (c, self.files(c).len()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flags(&self) -> LoaderFlags {
        LoaderFlags {
            sideloader: !self.files(Category::SideloaderMod).is_empty(),
            deli: !self.files(Category::DeliMod).is_empty(),
            lvo: !self.files(Category::LegacyVirtualObject).is_empty(),
        }
    }
}

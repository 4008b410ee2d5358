use crate::classifier::Category;
use std::path::PathBuf;

/// Category → destination folder, in creation order
pub const LAYOUT: [(Category, &[&str]); 4] = [
    (Category::SideloaderMod, &["Sideloader"]),
    (Category::PluginBinary, &["plugins"]),
    (Category::DeliMod, &["plugins", "DeliMods"]),
    (Category::LegacyVirtualObject, &["plugins", "LegacyVirtualObjects"]),
];

/// Destination folder for `category`, relative to the build root
pub fn destination(category: Category) -> PathBuf {
    LAYOUT
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, segments)| segments.iter().collect())
        .unwrap_or_default()
}

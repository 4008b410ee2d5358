use crate::error::{RepackError, Result};
use regex::Regex;

/// Longest description the package registry accepts
pub const MAX_DESCRIPTION_LEN: usize = 250;

fn pattern(source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|e| RepackError::InvalidMetadata(format!("regex error: {}", e)))
}

/// Derive a registry-safe package name from a display name.
///
/// "Big Gun (v2)!" becomes "Big_Gun_v2".
pub fn package_name(display_name: &str) -> Result<String> {
    let unsafe_chars = pattern(r"[^A-Za-z0-9_]")?;
    let underscores = pattern(r"_+")?;

    let replaced = unsafe_chars.replace_all(display_name.trim(), "_");
    let collapsed = underscores.replace_all(&replaced, "_");
    let name = collapsed.trim_matches('_');

    if name.is_empty() {
        return Err(RepackError::InvalidMetadata(format!(
            "'{}' has no characters usable in a package name",
            display_name
        )));
    }

    Ok(name.to_string())
}

/// Require a plain `MAJOR.MINOR.PATCH` version
pub fn validate_version(version: &str) -> Result<()> {
    if pattern(r"^\d+\.\d+\.\d+$")?.is_match(version) {
        Ok(())
    } else {
        Err(RepackError::InvalidMetadata(format!(
            "version '{}' is not MAJOR.MINOR.PATCH",
            version
        )))
    }
}

pub fn validate_description(description: &str) -> Result<()> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(RepackError::InvalidMetadata(format!(
            "description is {} characters, the limit is {}",
            len, MAX_DESCRIPTION_LEN
        )));
    }
    Ok(())
}

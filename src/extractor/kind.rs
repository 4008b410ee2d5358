use crate::error::{IoOp, RepackError, Result};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
const SEVEN_ZIP_MAGIC: [u8; 6] = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];

/// Container formats the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Zip,
    SevenZip,
}

impl ContainerKind {
    /// Pick the container kind from the archive's file-name suffix
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.ends_with(".zip") {
            Ok(ContainerKind::Zip)
        } else if name.ends_with(".7z") {
            Ok(ContainerKind::SevenZip)
        } else {
            Err(RepackError::UnsupportedContainerFormat(path.to_path_buf()))
        }
    }

    /// Match leading magic bytes
    pub fn detect(header: &[u8]) -> Option<Self> {
        if header.starts_with(&ZIP_MAGIC) || header.starts_with(&ZIP_EMPTY_MAGIC) {
            Some(ContainerKind::Zip)
        } else if header.starts_with(&SEVEN_ZIP_MAGIC) {
            Some(ContainerKind::SevenZip)
        } else {
            None
        }
    }

    /// Read the archive's header and detect its kind from magic bytes
    pub fn sniff(path: &Path) -> Result<Self> {
        let mut file = File::open(path).map_err(RepackError::io(IoOp::Open, path))?;
        let mut header = Vec::with_capacity(SEVEN_ZIP_MAGIC.len());
        file.by_ref()
            .take(SEVEN_ZIP_MAGIC.len() as u64)
            .read_to_end(&mut header)
            .map_err(RepackError::io(IoOp::Read, path))?;

        Self::detect(&header)
            .ok_or_else(|| RepackError::UnsupportedContainerFormat(path.to_path_buf()))
    }

    /// Suffix first, magic bytes as the fallback
    pub fn infer(path: &Path) -> Result<Self> {
        Self::from_path(path).or_else(|_| Self::sniff(path))
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Zip => f.write_str("zip"),
            ContainerKind::SevenZip => f.write_str("7z"),
        }
    }
}

use chrono::{Datelike, Timelike};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{IoOp, RepackError, Result};
use crate::security::PathSanitizer;

/// What ended up in a finished package
#[derive(Debug, Clone)]
pub struct PackageReport {
    pub path: PathBuf,
    /// Entry names in write order
    pub entries: Vec<String>,
    /// Hex SHA-256 of the archive file
    pub sha256: String,
}

/// Zips a populated build root into a distributable package
pub struct Packager {
    build_root: PathBuf,
}

impl Packager {
    pub fn new(build_root: impl Into<PathBuf>) -> Self {
        Self {
            build_root: build_root.into(),
        }
    }

    /// Every regular file below the build root as `(entry name, disk path)`,
    /// sorted by entry name. `exclude` is skipped if encountered.
    pub fn collect_entries(&self, exclude: Option<&Path>) -> Result<Vec<(String, PathBuf)>> {
        let root = fs::canonicalize(&self.build_root)
            .map_err(RepackError::io(IoOp::Open, &self.build_root))?;
        let mut entries = Vec::new();

        for item in WalkDir::new(&root).min_depth(1).sort_by_file_name() {
            let item = item.map_err(|e| {
                let path = e.path().unwrap_or(&root).to_path_buf();
                RepackError::Io {
                    op: IoOp::Read,
                    path,
                    source: io::Error::from(e),
                }
            })?;

            if !item.file_type().is_file() || Some(item.path()) == exclude {
                continue;
            }

            let relative = item.path().strip_prefix(&root).unwrap_or(item.path());
            entries.push((PathSanitizer::to_virtual(relative), item.path().to_path_buf()));
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    /// Write the package to `output`, replacing any existing file
    pub fn write_to_file(&self, output: &Path) -> Result<PackageReport> {
        let output = absolute_output(output)?;
        log::info!("Writing package to: {}", output.display());

        let entries = self.collect_entries(Some(&output))?;

        let file = File::create(&output).map_err(RepackError::io(IoOp::Create, &output))?;
        let mut zip = ZipWriter::new(file);

        let now = chrono::Local::now();
        let options: FileOptions<'_, ()> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644)
            .last_modified_time(
                zip::DateTime::from_date_and_time(
                    now.year() as u16,
                    now.month() as u8,
                    now.day() as u8,
                    now.hour() as u8,
                    now.minute() as u8,
                    now.second() as u8,
                )
                .unwrap_or_default(),
            );

        let mut names = Vec::with_capacity(entries.len());
        for (name, source) in entries {
            log::debug!("[package] Adding {}", name);
            zip.start_file(name.as_str(), options)
                .map_err(zip_failure(&output))?;
            let mut reader = File::open(&source).map_err(RepackError::io(IoOp::Open, &source))?;
            io::copy(&mut reader, &mut zip).map_err(RepackError::io(IoOp::Write, &output))?;
            names.push(name);
        }

        zip.finish().map_err(zip_failure(&output))?;

        let sha256 = sha256_file(&output)?;
        log::info!(
            "Packaged {} files into {} (sha256 {})",
            names.len(),
            output.display(),
            sha256
        );

        Ok(PackageReport {
            path: output,
            entries: names,
            sha256,
        })
    }
}

/// Resolve `output` against its canonical parent, which must exist
fn absolute_output(output: &Path) -> Result<PathBuf> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(RepackError::MissingDestinationParent(parent.to_path_buf()));
    }

    let file_name = output.file_name().ok_or_else(|| RepackError::Io {
        op: IoOp::Create,
        path: output.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"),
    })?;

    let parent = fs::canonicalize(parent).map_err(RepackError::io(IoOp::Open, parent))?;
    Ok(parent.join(file_name))
}

fn zip_failure(path: &Path) -> impl FnOnce(ZipError) -> RepackError + '_ {
    move |e| {
        let source = match e {
            ZipError::Io(source) => source,
            other => io::Error::other(other),
        };
        RepackError::Io {
            op: IoOp::Write,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Hex SHA-256 of a file's contents
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(RepackError::io(IoOp::Open, path))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(RepackError::io(IoOp::Read, path))?;
    Ok(hex::encode(hasher.finalize()))
}

use crate::error::{IoOp, RepackError, Result};
use crate::extractor::asset_file_name;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const LOCK_SUFFIX: &str = ".lock";

/// Exclusive claim on an asset's scratch and build directories.
///
/// Held for the length of a run; the lock file is removed on drop as long
/// as it still carries this holder's token.
#[derive(Debug)]
pub struct WorkspaceLock {
    path: PathBuf,
    token: String,
    released: bool,
}

impl WorkspaceLock {
    /// `<work_dir>/<archive file name>.lock`
    pub fn path_for(work_dir: &Path, archive_path: &Path) -> Result<PathBuf> {
        let name = asset_file_name(archive_path)?;
        Ok(work_dir.join(format!("{}{}", name, LOCK_SUFFIX)))
    }

    pub fn acquire(work_dir: &Path, archive_path: &Path) -> Result<Self> {
        let path = Self::path_for(work_dir, archive_path)?;
        let token = Uuid::new_v4().to_string();

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(RepackError::WorkspaceBusy(path));
            }
            Err(e) => {
                return Err(RepackError::Io {
                    op: IoOp::Create,
                    path,
                    source: e,
                });
            }
        };
        file.write_all(token.as_bytes())
            .map_err(RepackError::io(IoOp::Write, &path))?;

        log::debug!("Acquired workspace lock {} ({})", path.display(), token);
        Ok(Self {
            path,
            token,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Remove the lock file if it is still ours
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.remove_if_owned()
    }

    fn remove_if_owned(&self) -> Result<()> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents == self.token => {
                fs::remove_file(&self.path).map_err(RepackError::io(IoOp::Remove, &self.path))
            }
            Ok(_) => {
                log::warn!("Lock {} was taken over, leaving it", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RepackError::Io {
                op: IoOp::Read,
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.remove_if_owned() {
            log::warn!("Failed to release workspace lock: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_path() {
        let path = WorkspaceLock::path_for(Path::new("/work"), Path::new("/dl/MyMod.zip")).unwrap();
        assert_eq!(path, PathBuf::from("/work/MyMod.zip.lock"));
    }

    #[test]
    fn test_second_acquire_is_busy() {
        let work = tempfile::tempdir().unwrap();
        let archive = Path::new("MyMod.zip");

        let _held = WorkspaceLock::acquire(work.path(), archive).unwrap();
        let second = WorkspaceLock::acquire(work.path(), archive);
        assert!(matches!(second, Err(RepackError::WorkspaceBusy(_))));
    }

    #[test]
    fn test_different_assets_do_not_conflict() {
        let work = tempfile::tempdir().unwrap();
        let _a = WorkspaceLock::acquire(work.path(), Path::new("a.zip")).unwrap();
        let _b = WorkspaceLock::acquire(work.path(), Path::new("b.7z")).unwrap();
    }

    #[test]
    fn test_drop_releases() {
        let work = tempfile::tempdir().unwrap();
        let archive = Path::new("MyMod.zip");

        let lock = WorkspaceLock::acquire(work.path(), archive).unwrap();
        let path = lock.path().to_path_buf();
        assert_eq!(fs::read_to_string(&path).unwrap(), lock.token());
        drop(lock);

        assert!(!path.exists());
        WorkspaceLock::acquire(work.path(), archive).unwrap();
    }

    #[test]
    fn test_foreign_lock_left_in_place() {
        let work = tempfile::tempdir().unwrap();
        let lock = WorkspaceLock::acquire(work.path(), Path::new("MyMod.zip")).unwrap();
        let path = lock.path().to_path_buf();

        fs::write(&path, "someone-else").unwrap();
        lock.release().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "someone-else");
    }

    #[test]
    fn test_missing_work_dir() {
        let work = tempfile::tempdir().unwrap();
        let result = WorkspaceLock::acquire(&work.path().join("missing"), Path::new("a.zip"));
        assert!(matches!(result, Err(RepackError::Io { op: IoOp::Create, .. })));
    }
}

use crate::error::{IoOp, RepackError, Result};
use std::io::{self, Read, Write};
use std::path::Path;

/// Wraps an archive entry reader and remembers whether a read failed
struct EntryReader<'a, R: ?Sized> {
    inner: &'a mut R,
    failed: bool,
}

impl<R: Read + ?Sized> Read for EntryReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).inspect_err(|e| {
            if e.kind() != io::ErrorKind::Interrupted {
                self.failed = true;
            }
        })
    }
}

/// Copy one entry's data to `target`.
///
/// Decoder and checksum failures come from the reader and are reported as
/// `ArchiveCorrupt`; failures on the output side stay `Io { op: Write }`.
pub(super) fn copy_entry<R: Read + ?Sized, W: Write>(
    archive_path: &Path,
    relative: &str,
    reader: &mut R,
    target: &Path,
    out: &mut W,
) -> Result<u64> {
    let mut source = EntryReader {
        inner: reader,
        failed: false,
    };

    io::copy(&mut source, out).map_err(|e| {
        if source.failed {
            RepackError::corrupt(archive_path, format!("{}: {}", relative, e))
        } else {
            RepackError::Io {
                op: IoOp::Write,
                path: target.to_path_buf(),
                source: e,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingReader(io::ErrorKind);

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(self.0, "corrupt deflate stream"))
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only filesystem"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_read_failure_is_archive_corrupt() {
        let kinds = [
            io::ErrorKind::InvalidInput,
            io::ErrorKind::InvalidData,
            io::ErrorKind::Other,
        ];
        for kind in kinds {
            let mut out = Vec::new();
            let result = copy_entry(
                Path::new("Mod.zip"),
                "guns.deli",
                &mut FailingReader(kind),
                Path::new("/scratch/guns.deli"),
                &mut out,
            );
            match result {
                Err(RepackError::ArchiveCorrupt { path, reason }) => {
                    assert_eq!(path, Path::new("Mod.zip"));
                    assert!(reason.starts_with("guns.deli: "), "{}", reason);
                }
                other => panic!("expected ArchiveCorrupt for {:?}, got {:?}", kind, other),
            }
        }
    }

    #[test]
    fn test_write_failure_stays_io_write() {
        let mut data: &[u8] = b"payload";
        let result = copy_entry(
            Path::new("Mod.zip"),
            "a.dll",
            &mut data,
            Path::new("/scratch/a.dll"),
            &mut FailingWriter,
        );
        assert!(matches!(result, Err(RepackError::Io { op: IoOp::Write, .. })));
    }

    #[test]
    fn test_copy_counts_bytes() {
        let mut data: &[u8] = b"payload";
        let mut out = Vec::new();
        let written = copy_entry(
            Path::new("Mod.zip"),
            "a.dll",
            &mut data,
            Path::new("/scratch/a.dll"),
            &mut out,
        )
        .unwrap();
        assert_eq!(written, 7);
        assert_eq!(out, b"payload");
    }
}

#[cfg(test)]
mod tests {
    use crate::extractor::{ArchiveExtractor, ContainerKind, Extraction, parent_dir, scan_tree};
    use crate::test_utils::{
        flip_bytes, list_files, noisy_payload, write_7z, write_7z_raw_name, write_zip,
        zip_first_data_offset,
    };
    use crate::RepackError;
    use std::fs;
    use std::path::Path;

    fn extract_zip(work: &Path, entries: &[(&str, &[u8])]) -> Result<Extraction, RepackError> {
        let archive = work.join("MyMod.zip");
        write_zip(&archive, entries);
        ArchiveExtractor::new(work).extract(&archive, ContainerKind::Zip)
    }

    // ========================================================================
    // Zip
    // ========================================================================

    #[test]
    fn test_scratch_root_named_after_archive() {
        let extractor = ArchiveExtractor::new("/work");
        let root = extractor.scratch_root_for(Path::new("/downloads/MyMod.zip")).unwrap();
        assert_eq!(root, Path::new("/work/MyMod.zip.temp_dir"));
    }

    #[test]
    fn test_zip_extracts_files_and_directories() {
        let work = tempfile::tempdir().unwrap();
        let extraction = extract_zip(
            work.path(),
            &[
                ("BepInEx/", b""),
                ("BepInEx/plugins/MyMod.dll", b"MZ"),
                ("pack.hotmod", b"hotmod"),
            ],
        )
        .unwrap();

        assert_eq!(extraction.entries.len(), 3);
        assert_eq!(extraction.file_count(), 2);
        assert!(extraction.entries[0].is_dir);
        assert_eq!(
            list_files(&extraction.scratch_root),
            vec!["BepInEx/plugins/MyMod.dll", "pack.hotmod"]
        );
        assert_eq!(
            fs::read(extraction.scratch_root.join("pack.hotmod")).unwrap(),
            b"hotmod"
        );
    }

    #[test]
    fn test_zip_entry_paths_are_relative_to_scratch_root() {
        let work = tempfile::tempdir().unwrap();
        let extraction = extract_zip(work.path(), &[("a/b/c.deli", b"x")]).unwrap();

        let entry = &extraction.entries[0];
        assert_eq!(entry.relative_path, "a/b/c.deli");
        assert_eq!(entry.base_name(), "c.deli");
        assert_eq!(parent_dir(&entry.relative_path), "a/b");
        assert!(entry.disk_path.starts_with(&extraction.scratch_root));
    }

    #[test]
    fn test_zip_traversal_rejected_before_write() {
        let work = tempfile::tempdir().unwrap();
        let nested = work.path().join("inner");
        fs::create_dir(&nested).unwrap();

        let result = extract_zip(&nested, &[("ok.dll", b"ok"), ("../../evil.dll", b"evil")]);

        assert!(matches!(
            result,
            Err(RepackError::PathTraversalViolation { ref entry, .. }) if entry == "../../evil.dll"
        ));
        assert!(!work.path().join("evil.dll").exists());
        assert!(!nested.join("evil.dll").exists());
    }

    #[test]
    fn test_zip_absolute_entry_rejected() {
        let work = tempfile::tempdir().unwrap();
        let result = extract_zip(work.path(), &[("/tmp/evil.dll", b"evil")]);
        assert!(matches!(
            result,
            Err(RepackError::PathTraversalViolation { .. })
        ));
    }

    #[test]
    fn test_stale_scratch_directory_is_replaced() {
        let work = tempfile::tempdir().unwrap();
        let stale = work.path().join("MyMod.zip.temp_dir");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("leftover.dll"), b"old").unwrap();

        let extraction = extract_zip(work.path(), &[("fresh.dll", b"new")]).unwrap();

        assert_eq!(list_files(&extraction.scratch_root), vec!["fresh.dll"]);
    }

    #[test]
    fn test_corrupt_zip_reports_archive_corrupt() {
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("broken.zip");
        fs::write(&archive, b"PK\x03\x04 definitely not a zip").unwrap();

        let result = ArchiveExtractor::new(work.path()).extract(&archive, ContainerKind::Zip);
        assert!(matches!(result, Err(RepackError::ArchiveCorrupt { .. })));
    }

    #[test]
    fn test_zip_damaged_payload_reports_archive_corrupt() {
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("Guns.zip");
        let payload = noisy_payload(20 * 1024);
        write_zip(&archive, &[("guns.deli", &payload)]);

        let data = zip_first_data_offset(&archive);
        flip_bytes(&archive, data + 16..data + 24);

        let result = ArchiveExtractor::new(work.path()).extract(&archive, ContainerKind::Zip);
        match result {
            Err(RepackError::ArchiveCorrupt { path, reason }) => {
                assert_eq!(path, archive);
                assert!(reason.starts_with("guns.deli: "), "{}", reason);
            }
            other => panic!("expected ArchiveCorrupt, got {:?}", other),
        }
    }

    #[test]
    fn test_zip_backslash_alias_is_one_entry() {
        let work = tempfile::tempdir().unwrap();
        let extraction = extract_zip(
            work.path(),
            &[("sub/a.dll", b"first"), ("sub\\a.dll", b"second"), ("b.dll", b"b")],
        )
        .unwrap();

        let paths: Vec<_> = extraction
            .entries
            .iter()
            .map(|e| e.relative_path.as_str())
            .collect();
        assert_eq!(paths, vec!["sub/a.dll", "b.dll"]);
        assert_eq!(extraction.file_count(), 2);
        assert_eq!(
            fs::read(extraction.scratch_root.join("sub").join("a.dll")).unwrap(),
            b"second"
        );
    }

    #[test]
    fn test_missing_archive_reports_io_failure() {
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("absent.zip");

        let result = ArchiveExtractor::new(work.path()).extract(&archive, ContainerKind::Zip);
        assert!(matches!(result, Err(RepackError::Io { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_preserves_mode_bits() {
        use std::fs::File;
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;
        use zip::write::FileOptions;

        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("Tool.zip");
        let mut zip = zip::ZipWriter::new(File::create(&archive).unwrap());
        let options: FileOptions<'_, ()> = FileOptions::default().unix_permissions(0o755);
        zip.start_file("run.sh", options).unwrap();
        zip.write_all(b"#!/bin/sh").unwrap();
        zip.finish().unwrap();

        let extraction = ArchiveExtractor::new(work.path())
            .extract(&archive, ContainerKind::Zip)
            .unwrap();

        let entry = &extraction.entries[0];
        assert_eq!(entry.mode, Some(0o755));
        let mode = fs::metadata(&entry.disk_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_mode_without_owner_read_is_raised() {
        use std::fs::File;
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;
        use zip::write::FileOptions;

        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("Locked.zip");
        let mut zip = zip::ZipWriter::new(File::create(&archive).unwrap());
        let options: FileOptions<'_, ()> = FileOptions::default().unix_permissions(0o044);
        zip.start_file("locked.dll", options).unwrap();
        zip.write_all(b"MZ").unwrap();
        zip.finish().unwrap();

        let extraction = ArchiveExtractor::new(work.path())
            .extract(&archive, ContainerKind::Zip)
            .unwrap();

        let entry = &extraction.entries[0];
        assert_eq!(entry.mode, Some(0o444));
        let mode = fs::metadata(&entry.disk_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o444);
        assert_eq!(fs::read(&entry.disk_path).unwrap(), b"MZ");
    }

    // ========================================================================
    // 7z
    // ========================================================================

    #[test]
    fn test_7z_extracts_nested_files() {
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("Pack.7z");
        write_7z(
            &archive,
            &[("Guns/gun.hotmod", b"gun"), ("CustomMeshData", b"mesh")],
        );

        let extraction = ArchiveExtractor::new(work.path())
            .extract(&archive, ContainerKind::SevenZip)
            .unwrap();

        assert_eq!(
            list_files(&extraction.scratch_root),
            vec!["CustomMeshData", "Guns/gun.hotmod"]
        );
        assert_eq!(extraction.file_count(), 2);
    }

    #[test]
    fn test_7z_traversal_rejected() {
        let work = tempfile::tempdir().unwrap();
        let nested = work.path().join("inner");
        fs::create_dir(&nested).unwrap();
        let archive = nested.join("Evil.7z");
        write_7z_raw_name(&archive, "../../evil.dll", b"evil");

        let result = ArchiveExtractor::new(&nested).extract(&archive, ContainerKind::SevenZip);

        assert!(matches!(
            result,
            Err(RepackError::PathTraversalViolation { .. })
        ));
        assert!(!work.path().join("evil.dll").exists());
    }

    #[test]
    fn test_corrupt_7z_reports_archive_corrupt() {
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("broken.7z");
        fs::write(&archive, b"7z\xBC\xAF\x27\x1C garbage").unwrap();

        let result = ArchiveExtractor::new(work.path()).extract(&archive, ContainerKind::SevenZip);
        assert!(matches!(result, Err(RepackError::ArchiveCorrupt { .. })));
    }

    #[test]
    fn test_7z_damaged_payload_reports_archive_corrupt() {
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("Guns.7z");
        let payload = noisy_payload(20 * 1024);
        write_7z(&archive, &[("guns.deli", &payload)]);

        // Packed streams start right after the 32-byte signature header
        flip_bytes(&archive, 40..60);

        let result = ArchiveExtractor::new(work.path()).extract(&archive, ContainerKind::SevenZip);
        assert!(
            matches!(result, Err(RepackError::ArchiveCorrupt { .. })),
            "got {:?}",
            result
        );
    }

    // ========================================================================
    // Container kind and tree scanning
    // ========================================================================

    #[test]
    fn test_kind_from_suffix() {
        assert_eq!(
            ContainerKind::from_path(Path::new("Mod.ZIP")).unwrap(),
            ContainerKind::Zip
        );
        assert_eq!(
            ContainerKind::from_path(Path::new("dir/Mod.7z")).unwrap(),
            ContainerKind::SevenZip
        );
        assert!(matches!(
            ContainerKind::from_path(Path::new("Mod.rar")),
            Err(RepackError::UnsupportedContainerFormat(_))
        ));
    }

    #[test]
    fn test_kind_from_magic_bytes() {
        assert_eq!(
            ContainerKind::detect(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00]),
            Some(ContainerKind::Zip)
        );
        assert_eq!(
            ContainerKind::detect(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]),
            Some(ContainerKind::SevenZip)
        );
        assert_eq!(ContainerKind::detect(&[0xDE, 0xAD, 0xBE, 0xEF]), None);
        assert_eq!(ContainerKind::detect(&[0x50]), None);
    }

    #[test]
    fn test_infer_falls_back_to_sniffing() {
        let work = tempfile::tempdir().unwrap();
        let archive = work.path().join("download");
        write_zip(&archive, &[("a.dll", b"a")]);

        assert_eq!(ContainerKind::infer(&archive).unwrap(), ContainerKind::Zip);
    }

    #[test]
    fn test_scan_tree_lists_sorted_entries() {
        let work = tempfile::tempdir().unwrap();
        let extraction = extract_zip(
            work.path(),
            &[("z.dll", b"z"), ("a/b.deli", b"b"), ("a/c", b"c")],
        )
        .unwrap();

        let scanned = scan_tree(&extraction.scratch_root).unwrap();
        let paths: Vec<_> = scanned.iter().map(|e| e.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["a", "a/b.deli", "a/c", "z.dll"]);
        assert!(scanned[0].is_dir);
    }
}

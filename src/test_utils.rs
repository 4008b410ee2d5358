//! Archive fixtures shared by unit tests

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

/// Write a Zip archive; names ending in `/` become directory entries
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options: FileOptions<'_, ()> = FileOptions::default().unix_permissions(0o644);

    for (name, data) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
    }
    zip.finish().unwrap();
}

/// Write a 7z archive from a list of relative file paths and contents
pub fn write_7z(path: &Path, entries: &[(&str, &[u8])]) {
    let staging = tempfile::tempdir().unwrap();
    for (name, data) in entries {
        let file_path = staging.path().join(name);
        fs::create_dir_all(file_path.parent().unwrap()).unwrap();
        fs::write(&file_path, data).unwrap();
    }
    sevenz_rust::compress_to_path(staging.path(), path).unwrap();
}

/// Write a 7z archive whose single entry carries an arbitrary stored name
pub fn write_7z_raw_name(path: &Path, stored_name: &str, data: &[u8]) {
    let staging = tempfile::tempdir().unwrap();
    let source = staging.path().join("payload.bin");
    fs::write(&source, data).unwrap();

    let mut writer = sevenz_rust::SevenZWriter::create(path).unwrap();
    writer
        .push_archive_entry(
            sevenz_rust::SevenZArchiveEntry::from_path(&source, stored_name.to_string()),
            Some(File::open(&source).unwrap()),
        )
        .unwrap();
    writer.finish().unwrap();
}

/// Create files (and parent directories) below `root`
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, data)| {
            let path = root.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, data).unwrap();
            path
        })
        .collect()
}

/// All regular files below `root` as sorted forward-slash relative paths
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    files.sort();
    files
}

/// Mildly compressible bytes, so compressed streams are long enough to damage
pub fn noisy_payload(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x2545_F491;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            b'a' + ((state >> 24) % 16) as u8
        })
        .collect()
}

/// Offset of the first entry's data in a Zip file (after its local header)
pub fn zip_first_data_offset(path: &Path) -> usize {
    let bytes = fs::read(path).unwrap();
    let name_len = u16::from_le_bytes([bytes[26], bytes[27]]) as usize;
    let extra_len = u16::from_le_bytes([bytes[28], bytes[29]]) as usize;
    30 + name_len + extra_len
}

/// Invert every byte in `range`
pub fn flip_bytes(path: &Path, range: std::ops::Range<usize>) {
    let mut bytes = fs::read(path).unwrap();
    for byte in &mut bytes[range] {
        *byte ^= 0xFF;
    }
    fs::write(path, bytes).unwrap();
}

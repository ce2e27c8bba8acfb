use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::ProvisionError;

/// Packs every regular file at the top level of `dir` into an in-memory zip
/// archive. Subdirectories are skipped; files are not filtered by type or
/// size. Entries are added in name order so the same directory always
/// produces the same archive.
pub fn pack_directory(dir: &Path) -> Result<Vec<u8>, ProvisionError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
    }
    files.sort();

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, path) in &files {
        debug!(file = %name, "Adding pattern file to archive");
        writer.start_file(name.as_str(), options)?;
        writer.write_all(&fs::read(path)?)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn packs_top_level_files_and_skips_subdirectories() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("b.json"), b"{\"b\":true}").unwrap();
        fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), b"hidden").unwrap();

        let bytes = pack_directory(dir.path()).expect("archive should build");

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.json"]);

        let mut contents = String::new();
        archive
            .by_name("a.txt")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "alpha");
    }

    #[test]
    fn empty_directory_yields_empty_archive() {
        let dir = tempfile::tempdir().expect("temp dir");
        let bytes = pack_directory(dir.path()).expect("archive should build");
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
        assert_eq!(archive.len(), 0);
    }
}

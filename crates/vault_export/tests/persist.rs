use std::fs;

use tempfile::TempDir;
use vault_export::{ensure_output_dir, ArchiveSaver, AtomicFileWriter, DirectorySaver};

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("images_export.zip", b"old").unwrap();
    assert_eq!(first.file_name().unwrap(), "images_export.zip");

    let second = writer.write("images_export.zip", b"new").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"new");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("files_export.zip", b"data").is_err());
    assert!(!file_path.with_file_name("files_export.zip").exists());
}

#[test]
fn directory_saver_writes_offered_archive() {
    let temp = TempDir::new().unwrap();
    let saver = DirectorySaver::new(temp.path().join("downloads"));

    saver.offer("documents_export.zip", b"PK");

    let saved = fs::read(temp.path().join("downloads/documents_export.zip")).unwrap();
    assert_eq!(saved, b"PK");
}

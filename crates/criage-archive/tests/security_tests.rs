//! Path traversal tests against hostile archives.
//!
//! Each archive carries a benign entry, then an escaping entry, then another
//! benign entry. Extraction must fail on the escaping entry and write nothing
//! for it or for anything after it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use criage_archive::ArchiveError;
use criage_archive::ArchiveFormat;
use criage_archive::ArchiveManager;
use criage_archive::ExtractionReport;
use criage_archive::ManagerConfig;
use criage_archive::Result;
use criage_archive::test_utils::TarTestBuilder;
use criage_archive::test_utils::ZipTestBuilder;
use criage_archive::test_utils::compress;
use tempfile::TempDir;

const ESCAPES: &[&str] = &[
    "../evil.txt",
    "../../evil.txt",
    "foo/../../evil.txt",
    "./../evil.txt",
    "/tmp/criage-absolute-evil.txt",
];

fn manager() -> ArchiveManager {
    ArchiveManager::new(ManagerConfig::default()).unwrap()
}

fn assert_stopped_at_escape(result: Result<ExtractionReport>, out: &Path, name: &str) {
    let err = result.unwrap_err();
    assert!(
        matches!(err, ArchiveError::PathTraversal { .. }),
        "{name}: {err:?}"
    );
    assert!(err.is_security_violation());
    assert!(out.join("before.txt").exists(), "{name}");
    assert!(!out.join("after.txt").exists(), "{name}");
}

#[test]
fn test_tar_traversal_aborts_extraction() {
    for format in ArchiveFormat::all().filter(|f| f.is_tar()) {
        for name in ESCAPES {
            let temp = TempDir::new().unwrap();
            let tar = TarTestBuilder::new()
                .add_file("before.txt", b"ok")
                .add_raw_file(name, b"evil")
                .add_file("after.txt", b"late")
                .build();
            let archive = temp.path().join(format!("hostile{}", format.extension()));
            fs::write(&archive, compress(format, &tar)).unwrap();

            let out = temp.path().join("a/b/out");
            let result = manager().extract_archive(&archive, &out, format);
            assert_stopped_at_escape(result, &out, name);
            assert!(!temp.path().join("a/b/evil.txt").exists());
            assert!(!temp.path().join("a/evil.txt").exists());
        }
    }
    assert!(!Path::new("/tmp/criage-absolute-evil.txt").exists());
}

#[test]
fn test_zip_traversal_aborts_extraction() {
    for name in ESCAPES {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .add_file("before.txt", b"ok")
            .add_file(name, b"evil")
            .add_file("after.txt", b"late")
            .build();
        let archive = temp.path().join("hostile.zip");
        fs::write(&archive, data).unwrap();

        let out = temp.path().join("a/b/out");
        let result = manager().extract_archive(&archive, &out, ArchiveFormat::Zip);
        assert_stopped_at_escape(result, &out, name);
        assert!(!temp.path().join("a/b/evil.txt").exists());
    }
}

#[test]
fn test_sibling_prefix_is_not_inside_destination() {
    let temp = TempDir::new().unwrap();
    let tar = TarTestBuilder::new()
        .add_file("before.txt", b"ok")
        .add_raw_file("../out-evil/x.txt", b"evil")
        .build();
    let archive = temp.path().join("hostile.tar.gz");
    fs::write(&archive, compress(ArchiveFormat::TarGz, &tar)).unwrap();

    let out = temp.path().join("out");
    let err = manager()
        .extract_archive(&archive, &out, ArchiveFormat::TarGz)
        .unwrap_err();
    assert!(matches!(err, ArchiveError::PathTraversal { .. }));
    assert!(!temp.path().join("out-evil").exists());
}

#[test]
fn test_inner_parent_segments_stay_inside() {
    let temp = TempDir::new().unwrap();
    let tar = TarTestBuilder::new()
        .add_raw_file("docs/../notes.txt", b"fine")
        .build();
    let archive = temp.path().join("ok.tar.xz");
    fs::write(&archive, compress(ArchiveFormat::TarXz, &tar)).unwrap();

    let out = temp.path().join("out");
    manager()
        .extract_archive(&archive, &out, ArchiveFormat::TarXz)
        .unwrap();
    assert_eq!(fs::read(out.join("notes.txt")).unwrap(), b"fine");
}

#[test]
fn test_root_directory_entry_is_accepted() {
    let temp = TempDir::new().unwrap();
    let tar = TarTestBuilder::new()
        .add_raw_directory("./")
        .add_file("a.txt", b"a")
        .build();
    let archive = temp.path().join("root.tar.gz");
    fs::write(&archive, compress(ArchiveFormat::TarGz, &tar)).unwrap();

    let out = temp.path().join("out");
    let report = manager()
        .extract_archive(&archive, &out, ArchiveFormat::TarGz)
        .unwrap();
    assert_eq!(report.files_extracted, 1);
    assert_eq!(report.directories_created, 0);
}

#[test]
fn test_root_file_entry_is_malformed() {
    let temp = TempDir::new().unwrap();
    let tar = TarTestBuilder::new().add_raw_file("./", b"x").build();
    let archive = temp.path().join("root.tar.gz");
    fs::write(&archive, compress(ArchiveFormat::TarGz, &tar)).unwrap();

    let err = manager()
        .extract_archive(&archive, temp.path().join("out"), ArchiveFormat::TarGz)
        .unwrap_err();
    assert!(matches!(err, ArchiveError::MalformedContainer { .. }), "{err:?}");
}

#[test]
fn test_symlink_then_file_through_it_is_contained() {
    let temp = TempDir::new().unwrap();
    let outside = temp.path().join("outside");
    fs::create_dir(&outside).unwrap();

    let data = ZipTestBuilder::new()
        .add_symlink("link", outside.to_str().unwrap())
        .add_file("link/payload.txt", b"evil")
        .build();
    let archive = temp.path().join("chain.zip");
    fs::write(&archive, data).unwrap();

    let out = temp.path().join("out");
    manager()
        .extract_archive(&archive, &out, ArchiveFormat::Zip)
        .unwrap();
    // The symlink is never created, so the file lands in a real directory.
    assert!(out.join("link").is_dir());
    assert!(!outside.join("payload.txt").exists());
}

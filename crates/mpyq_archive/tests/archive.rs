mod common;

use std::io::{Cursor, Read};

use common::{build_archive, write_archive, Member};
use mpyq_archive::{error::Error, error::Result, MpqArchive};
use pretty_assertions::assert_eq;
use tracing::info;
use tracing_test::traced_test;

fn members() -> Vec<Member<'static>> {
    vec![
        Member::new("hello.txt", 1_700_000_000, b"Hello World"),
        Member::new("config/game.json", 1_700_000_100, br#"{"fps":60}"#),
        Member::new("ui/icons/atlas.png", 1_700_000_200, &[0x89, 0x50, 0x4E, 0x47, 0x00]),
        Member::new("empty.bin", 1_700_000_300, b""),
    ]
}

#[traced_test]
#[test]
fn read_every_member() -> Result<()> {
    let members = members();
    let archive = MpqArchive::new(Cursor::new(build_archive(&members)))?;

    assert!(archive.is_valid());
    assert_eq!(archive.len(), members.len());
    assert_eq!(
        archive.file_names().collect::<Vec<_>>(),
        members.iter().map(|m| m.key).collect::<Vec<_>>()
    );

    for member in &members {
        info!("comparing {}", member.key);
        let entry = archive.find(member.key).expect("member should be present");
        assert_eq!(entry.file_date, member.date);
        assert_eq!(archive.read_file(member.key)?, member.data);
    }

    Ok(())
}

#[traced_test]
#[test]
fn stream_every_member() -> Result<()> {
    let members = members();
    let mut archive = MpqArchive::new(Cursor::new(build_archive(&members)))?;

    for (index, member) in members.iter().enumerate() {
        let mut buffer = Vec::new();
        let mut file = archive.by_index(index)?;
        assert_eq!(file.name(), member.key);
        file.read_to_end(&mut buffer)?;
        assert_eq!(buffer, member.data);
    }

    Ok(())
}

#[traced_test]
#[test]
fn missing_member_is_not_found() -> Result<()> {
    let archive = MpqArchive::new(Cursor::new(build_archive(&members())))?;

    let err = archive.read_file("missing.txt").unwrap_err();
    assert!(err.is_not_found());
    assert!(logs_contain("the file is not in the archive"));

    Ok(())
}

#[traced_test]
#[test]
fn open_from_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("base.mpq");
    write_archive(&path, &members());

    let archive = MpqArchive::open(&path)?;
    assert_eq!(archive.read_file("config/game.json")?, br#"{"fps":60}"#);
    assert_eq!(archive.header().entry_count, 4);

    Ok(())
}

#[traced_test]
#[test]
fn open_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = MpqArchive::open(dir.path().join("absent.mpq"));
    assert!(matches!(result, Err(Error::IOError(_))));
}

#[traced_test]
#[test]
fn extract_all_into_empty_directory() -> Result<()> {
    let members = members();
    let archive = MpqArchive::new(Cursor::new(build_archive(&members)))?;

    let dir = tempfile::tempdir()?;
    assert_eq!(archive.extract_all(dir.path())?, members.len());

    for member in &members {
        let written = std::fs::read(dir.path().join(member.key))?;
        assert_eq!(written, member.data);
    }

    // Directories that already exist are reused
    assert_eq!(archive.extract_all(dir.path())?, members.len());

    Ok(())
}

#[traced_test]
#[test]
fn extract_single_file() -> Result<()> {
    let archive = MpqArchive::new(Cursor::new(build_archive(&members())))?;

    let dir = tempfile::tempdir()?;
    let target = dir.path().join("a").join("b").join("atlas.png");
    archive.extract_file("ui/icons/atlas.png", &target)?;
    assert_eq!(std::fs::read(&target)?, vec![0x89, 0x50, 0x4E, 0x47, 0x00]);

    Ok(())
}

#[traced_test]
#[test]
fn extract_refuses_escaping_keys() -> Result<()> {
    let archive = MpqArchive::new(Cursor::new(build_archive(&[Member::new(
        "../outside.txt",
        1,
        b"nope",
    )])))?;

    let dir = tempfile::tempdir()?;
    let target = dir.path().join("inner");
    assert!(matches!(
        archive.extract_all(&target),
        Err(Error::UnsafePath(_))
    ));
    assert!(!dir.path().join("outside.txt").exists());

    Ok(())
}

#[traced_test]
#[test]
fn verify_packed_digests() -> Result<()> {
    let archive = MpqArchive::new(Cursor::new(build_archive(&members())))?;

    assert!(archive.verify_all()?.is_empty());
    archive.verify("hello.txt")?;

    Ok(())
}

#[traced_test]
#[test]
fn duplicate_keys_resolve_to_first() -> Result<()> {
    let archive = MpqArchive::new(Cursor::new(build_archive(&[
        Member::new("a.txt", 1, b"first"),
        Member::new("a.txt", 2, b"second"),
    ])))?;

    assert_eq!(archive.len(), 2);
    assert_eq!(archive.read_file("a.txt")?, b"first");

    Ok(())
}

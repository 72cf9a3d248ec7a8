//! Builds archives in memory the way the packer lays them out.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;

use binrw::BinWrite;
use mpyq_archive::checksum::digest_hex;
use mpyq_archive::types::{MpqEntryRecord, MpqHeader, HEADER_SIZE};
use mpyq_archive::HashTable;

/// A file to pack: name, date and payload
pub struct Member<'a> {
    pub key: &'a str,
    pub date: i32,
    pub data: &'a [u8],
}

impl<'a> Member<'a> {
    pub fn new(key: &'a str, date: i32, data: &'a [u8]) -> Self {
        Self { key, date, data }
    }
}

pub fn build_archive(members: &[Member<'_>]) -> Vec<u8> {
    let mut directory = Cursor::new(Vec::new());
    let mut offset = 0;
    for (index, member) in members.iter().enumerate() {
        let (hash_a, hash_b) = HashTable::shared()
            .name_hashes(member.key)
            .expect("test names should be hashable");

        MpqEntryRecord {
            hash_a: i64::from(hash_a),
            hash_b: i64::from(hash_b),
            index: index as i32 + 1,
            key: member.key.to_owned(),
            file_date: member.date,
            md5: digest_hex(member.data),
            file_offset: offset,
            file_size: member.data.len() as i32,
        }
        .write(&mut directory)
        .expect("record should serialize");

        offset += member.data.len() as i32;
    }

    let directory = directory.into_inner();
    let blocks_offset = HEADER_SIZE + directory.len() as i32;
    let header = MpqHeader {
        archive_size: blocks_offset + offset,
        entry_count: members.len() as i32,
        blocks_offset,
        ..Default::default()
    };

    let mut output = Cursor::new(Vec::new());
    header.write(&mut output).expect("header should serialize");
    output.write_all(&directory).unwrap();
    for member in members {
        output.write_all(member.data).unwrap();
    }

    output.into_inner()
}

pub fn write_archive(path: &Path, members: &[Member<'_>]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, build_archive(members)).unwrap();
}

pub fn write_corrupt_archive(path: &Path) {
    let mut data = build_archive(&[Member::new("broken.txt", 1, b"broken")]);
    data[..4].copy_from_slice(b"MPQ\x1A");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, data).unwrap();
}

//! Base types for structure of MPYQ file.

use binrw::{binrw, BinRead, BinWrite};
use std::sync::atomic::{AtomicU64, Ordering};

/// The tag every valid archive starts with
pub const MPYQ_MAGIC: [u8; 4] = *b"MPYQ";

/// Size of the fixed [`MpqHeader`] in bytes
pub const HEADER_SIZE: i32 = 28;

/// MPYQ file header
///
/// All data is stored in little endian format. Unlike most headers the magic is kept as a plain
/// field, a mismatch marks the archive invalid instead of failing the parse.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct MpqHeader {
    /// Should always be [`MPYQ_MAGIC`]
    pub magic: [u8; 4],

    /// Size of this header, always 28 for archives written by the packer
    pub header_size: i32,

    /// Format version
    pub version: i32,

    /// Total size of the archive in bytes
    pub archive_size: i32,

    /// The number of entries stored in the directory
    pub entry_count: i32,

    /// The offset from the beginning of the file where the directory starts
    pub entries_offset: i32,

    /// The offset from the beginning of the file where payloads start
    pub blocks_offset: i32,
}

impl MpqHeader {
    /// Whether the header carries the expected magic
    pub fn is_valid(&self) -> bool {
        self.magic == MPYQ_MAGIC
    }
}

impl Default for MpqHeader {
    fn default() -> Self {
        Self {
            magic: MPYQ_MAGIC,
            header_size: HEADER_SIZE,
            version: 1,
            archive_size: HEADER_SIZE,
            entry_count: Default::default(),
            entries_offset: HEADER_SIZE,
            blocks_offset: HEADER_SIZE,
        }
    }
}

/// MPYQ directory record
///
/// Defines an entry in the MPYQ file as it is laid out on disk. The key and digest are prefixed
/// by their length in bytes.
#[binrw]
#[brw(little)]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MpqEntryRecord {
    /// [`crate::hash::HashType::NameA`] hash of the key
    pub hash_a: i64,

    /// [`crate::hash::HashType::NameB`] hash of the key
    pub hash_b: i64,

    /// Position the packer assigned to the entry, starting at 1
    pub index: i32,

    #[br(temp, assert(key_len >= 0, "negative key length {}", key_len))]
    #[bw(calc = key.len() as i32)]
    key_len: i32,

    /// Logical path of the file inside the archive
    #[br(count = key_len as usize, try_map = String::from_utf8)]
    #[bw(map = |key: &String| key.as_bytes().to_vec())]
    pub key: String,

    /// Modification time of the file as a unix timestamp
    pub file_date: i32,

    #[br(temp, assert(md5_len >= 0, "negative digest length {}", md5_len))]
    #[bw(calc = md5.len() as i32)]
    md5_len: i32,

    /// Hex encoded MD5 digest of the payload
    #[br(count = md5_len as usize, try_map = String::from_utf8)]
    #[bw(map = |md5: &String| md5.as_bytes().to_vec())]
    pub md5: String,

    /// The offset to the payload from [`MpqHeader::blocks_offset`]
    #[br(assert(file_offset >= 0, "negative file offset {}", file_offset))]
    pub file_offset: i32,

    /// The size of the payload
    #[br(assert(file_size >= 0, "negative file size {}", file_size))]
    pub file_size: i32,
}

static NEXT_ARCHIVE_ID: AtomicU64 = AtomicU64::new(1);

/// Handle identifying the archive an [`MpqEntry`] was read from
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchiveId(u64);

impl ArchiveId {
    pub(crate) fn next() -> Self {
        ArchiveId(NEXT_ARCHIVE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw value of this handle
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Structure representing an MPYQ file entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpqEntry {
    /// Archive this entry belongs to
    pub archive: ArchiveId,
    /// First name hash as stored in the archive
    pub hash_a: i64,
    /// Second name hash as stored in the archive
    pub hash_b: i64,
    /// Index assigned by the packer
    pub index: i32,
    /// Name of the file
    ///
    /// It is dangerous to use this name directly when extracting an archive, see
    /// [`crate::read::MpqArchive::extract_all`].
    pub key: String,
    /// Modification time as a unix timestamp
    pub file_date: i32,
    /// Hex encoded MD5 digest of the payload
    pub md5: String,
    /// Offset of the payload relative to the block area
    pub file_offset: u64,
    /// Size of the payload
    pub file_size: u64,
}

impl MpqEntry {
    pub(crate) fn from_record(archive: ArchiveId, record: MpqEntryRecord) -> Self {
        Self {
            archive,
            hash_a: record.hash_a,
            hash_b: record.hash_b,
            index: record.index,
            key: record.key,
            file_date: record.file_date,
            md5: record.md5,
            file_offset: record.file_offset as u64,
            file_size: record.file_size as u64,
        }
    }

    /// Whether the stored hashes agree with the given `(hash_a, hash_b)` pair
    pub fn hashes_match(&self, (hash_a, hash_b): (u32, u32)) -> bool {
        self.hash_a == i64::from(hash_a) && self.hash_b == i64::from(hash_b)
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{MpqEntryRecord, MpqHeader};

    #[test]
    fn read_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x4D, 0x50, 0x59, 0x51,
            0x1C, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x45, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x1C, 0x00, 0x00, 0x00,
            0x40, 0x00, 0x00, 0x00,
        ]);

        let expected = MpqHeader {
            archive_size: 0x45,
            entry_count: 1,
            blocks_offset: 0x40,
            ..Default::default()
        };

        let header = MpqHeader::read(&mut input)?;
        assert_eq!(header, expected);
        assert!(header.is_valid());

        Ok(())
    }

    #[test]
    fn read_header_with_bad_magic() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x4D, 0x50, 0x51, 0x1A,
            0x1C, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x1C, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x1C, 0x00, 0x00, 0x00,
            0x1C, 0x00, 0x00, 0x00,
        ]);

        let header = MpqHeader::read(&mut input)?;
        assert_eq!(header.magic, *b"MPQ\x1A");
        assert!(!header.is_valid());

        Ok(())
    }

    #[test]
    fn read_truncated_header() {
        let mut input = Cursor::new(vec![0x4D, 0x50, 0x59, 0x51, 0x1C, 0x00]);
        assert!(MpqHeader::read(&mut input).is_err());
    }

    #[test]
    fn write_header() -> Result<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x4D, 0x50, 0x59, 0x51,
            0x1C, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x1C, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x1C, 0x00, 0x00, 0x00,
            0x1C, 0x00, 0x00, 0x00,
        ];

        let mut actual = Vec::new();
        MpqHeader::default().write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn read_record() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0xF0, 0xB9, 0x5D, 0x77, 0x00, 0x00, 0x00, 0x00,
            0xBC, 0xA0, 0xB0, 0x8F, 0x00, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x05, 0x00, 0x00, 0x00,
            b'a', b'.', b't', b'x', b't',
            0x64, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            b'f', b'f',
            0x00, 0x00, 0x00, 0x00,
            0x0B, 0x00, 0x00, 0x00,
        ]);

        let expected = MpqEntryRecord {
            hash_a: 0x775D_B9F0,
            hash_b: 0x8FB0_A0BC,
            index: 1,
            key: "a.txt".into(),
            file_date: 100,
            md5: "ff".into(),
            file_offset: 0,
            file_size: 11,
        };

        assert_eq!(MpqEntryRecord::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn write_record() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x03, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            b'x',
            0xC8, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x05, 0x00, 0x00, 0x00,
        ];

        let record = MpqEntryRecord {
            hash_a: 1,
            hash_b: 2,
            index: 3,
            key: "x".into(),
            file_date: 200,
            md5: String::new(),
            file_offset: 4,
            file_size: 5,
        };

        let mut actual = Vec::new();
        record.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn read_record_with_negative_length() {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0xFF, 0xFF, 0xFF, 0xFF,
        ]);

        assert!(MpqEntryRecord::read(&mut input).is_err());
    }

    #[test]
    fn read_record_with_invalid_utf8() {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0xC3, 0x28,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ]);

        assert!(MpqEntryRecord::read(&mut input).is_err());
    }
}

//! This library handles reading **MPYQ** resource archives and overlaying several of them into
//! one file system.
//!
//! # MPYQ Archive Format Documentation
//!
//! An MPYQ archive is a simplified take on the Blizzard MPQ container. It keeps the MPQ string
//! hash as an integrity check on names but replaces the hash and block tables with a plain
//! directory list. Payloads are stored verbatim, there is neither compression nor encryption.
//! MPYQ files are typically identified with the `.mpq` extension.
//!
//! ## File Structure
//!
//! An MPYQ file consists of a header, followed by the directory entries and then the data blocks.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: `MPYQ`                                            |
//! | 0x0004         | Header Size            | 4 bytes: Size of the header, 28                            |
//! | 0x0008         | Version                | 4 bytes: Format version, 1                                 |
//! | 0x000C         | Archive Size           | 4 bytes: Size of the whole archive                         |
//! | 0x0010         | Entry Count            | 4 bytes: Number of entries in the directory                |
//! | 0x0014         | Entries Offset         | 4 bytes: Offset to the directory                           |
//! | 0x0018         | Blocks Offset          | 4 bytes: Offset to the data blocks                         |
//!
//! ### Header
//!
//! - **Magic Number**: The ASCII characters `MPYQ`. An archive with any other magic is reported as
//!   invalid and refuses every read.
//! - **Entry Count**: A 4-byte signed integer indicating the number of entries in the directory.
//! - **Blocks Offset**: A 4-byte signed integer specifying where the payloads start. Each entry
//!   locates its payload relative to this offset.
//!
//! ### Directory
//!
//! The directory follows the header immediately and holds one variable sized record per file:
//!
//! | Field                  | Description                                                     |
//! |------------------------|-----------------------------------------------------------------|
//! | Hash A                 | 8 bytes: MPQ hash of the key with hash type 1                   |
//! | Hash B                 | 8 bytes: MPQ hash of the key with hash type 2                   |
//! | Index                  | 4 bytes: Position assigned by the packer                        |
//! | Key Length             | 4 bytes: Length of the key in bytes                             |
//! | Key                    | (Key Length) bytes: UTF-8 path of the file                      |
//! | File Date              | 4 bytes: Modification time as a unix timestamp                  |
//! | MD5 Length             | 4 bytes: Length of the digest in bytes                          |
//! | MD5                    | (MD5 Length) bytes: Hex encoded MD5 of the payload              |
//! | File Offset            | 4 bytes: Offset of the payload from the blocks offset           |
//! | File Size              | 4 bytes: Size of the payload                                    |
//!
//! A name only resolves to an entry when the key matches exactly and both stored hashes agree with
//! the hashes of the requested name, see [`hash`].
//!
//! ## Overlays
//!
//! [`MpqFileSystem`] loads every archive below a directory. When several archives hold the same
//! key, the entry with the greatest file date is served, ties keep the entry loaded first.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.mpq`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod checksum;
pub mod error;
pub mod extract;
pub mod filesystem;
pub mod hash;
pub mod read;
pub mod types;

pub use extract::ExtractMode;
pub use filesystem::{MpqFileSystem, MpqFileSystemOptions};
pub use hash::{hash_string, HashTable, HashType};
pub use read::MpqArchive;
pub use types::{ArchiveId, MpqEntry};

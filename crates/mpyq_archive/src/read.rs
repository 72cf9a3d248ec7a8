//! Types for reading MPYQ archives
//!

use binrw::BinRead;
use std::{
    collections::HashMap,
    fmt::{self, Debug},
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::Path,
    sync::Mutex,
};
use tracing::{debug, error, instrument, warn};

use crate::{
    checksum::{self, Mismatch},
    error::{Error, FileNotFoundError, Result},
    extract::{enclosed_path, write_file},
    hash::HashTable,
    types::{ArchiveId, MpqEntry, MpqEntryRecord, MpqHeader},
};

/// A struct for reading an entry from an MPYQ file
///
/// Reads are limited to the payload of the entry. If the underlying stream ends before the
/// payload is complete, the read fails with [`io::ErrorKind::UnexpectedEof`].
pub struct MpqFile<'a, R: Read + Seek> {
    entry: &'a MpqEntry,
    reader: &'a mut R,
    remaining: u64,
}

impl<'a, R: Read + Seek> Debug for MpqFile<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MpqFile({:#?})", self.entry)
    }
}

/// Methods for retrieving information on MPYQ file entries
impl<'a, R: Read + Seek> MpqFile<'a, R> {
    /// Get the name of the file
    pub fn name(&self) -> &str {
        &self.entry.key
    }

    /// Get the size of the file, in bytes
    pub fn size(&self) -> u64 {
        self.entry.file_size
    }

    /// Get the modification date of the file
    pub fn date(&self) -> i32 {
        self.entry.file_date
    }

    /// Get the directory entry describing this file
    pub fn entry(&self) -> &MpqEntry {
        self.entry
    }
}

impl<R: Read + Seek> Read for MpqFile<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let limit = usize::try_from(self.remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let read = self.reader.read(&mut buf[..limit])?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "archive ended {} bytes before the end of {}",
                    self.remaining, self.entry.key
                ),
            ));
        }

        self.remaining -= read as u64;
        Ok(read)
    }
}

/// MPYQ archive reader
///
/// The whole directory is parsed when the archive is opened, the reader is then kept for random
/// access to payloads. It sits behind a lock so that [`MpqArchive::read_file`] can be shared
/// between threads.
///
/// ```no_run
/// fn dump_archive(path: &str) -> mpyq_archive::error::Result<()> {
///     let archive = mpyq_archive::MpqArchive::open(path)?;
///
///     for entry in archive.entries() {
///         let data = archive.read_file(&entry.key)?;
///         println!("{}: {} bytes", entry.key, data.len());
///     }
///
///     Ok(())
/// }
/// ```
pub struct MpqArchive<R> {
    id: ArchiveId,
    reader: Mutex<R>,
    header: MpqHeader,
    valid: bool,
    entries: Vec<MpqEntry>,
    names: HashMap<String, Vec<usize>>,
    table: &'static HashTable,
}

impl<R> Debug for MpqArchive<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MpqArchive")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("valid", &self.valid)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl MpqArchive<File> {
    /// Open the archive stored at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R> MpqArchive<R> {
    /// Handle shared by every entry read from this archive
    pub fn id(&self) -> ArchiveId {
        self.id
    }

    /// Whether the header carried the expected magic
    ///
    /// An invalid archive refuses every read.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The parsed header
    pub fn header(&self) -> &MpqHeader {
        &self.header
    }

    /// Number of entries contained in this archive.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over all the file names in this archive, in directory order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// A copy of the directory, in the order it is stored in the file.
    pub fn entries(&self) -> Vec<MpqEntry> {
        self.entries.clone()
    }

    /// Get a directory entry by its position.
    pub fn entry(&self, index: usize) -> Option<&MpqEntry> {
        self.entries.get(index)
    }

    /// Total size of the payloads in the archive, if it fits.
    pub fn payload_size(&self) -> Option<u128> {
        let mut total = 0u128;
        for entry in &self.entries {
            total = total.checked_add(entry.file_size as u128)?;
        }
        Some(total)
    }

    /// Search for a file entry by name
    ///
    /// The entry must carry the exact name and both of its stored hashes must agree with the
    /// hashes of `name`. When several entries share a name the first one in directory order that
    /// passes wins.
    pub fn find(&self, name: &str) -> Option<&MpqEntry> {
        self.position(name).map(|index| &self.entries[index])
    }

    fn position(&self, name: &str) -> Option<usize> {
        if !self.valid {
            return None;
        }

        let candidates = self.names.get(name)?;
        let hashes = self.table.name_hashes(name)?;

        candidates
            .iter()
            .copied()
            .find(|&index| self.entries[index].hashes_match(hashes))
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        if !self.valid {
            return Err(Error::InvalidArchive);
        }

        self.position(name).ok_or_else(|| {
            error!("the file is not in the archive: {name}");
            FileNotFoundError::Name(name.to_owned()).into()
        })
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> Result<R> {
        self.reader.into_inner().map_err(|_| Error::LockPoisoned)
    }

    fn data_start(&self, entry: &MpqEntry) -> Result<u64> {
        let blocks = u64::try_from(self.header.blocks_offset).map_err(|_| {
            Error::CustomError(format!(
                "negative block offset {}",
                self.header.blocks_offset
            ))
        })?;
        Ok(blocks + entry.file_offset)
    }
}

impl<R: Read + Seek> MpqArchive<R> {
    /// Read an MPYQ archive collecting the files it contains.
    ///
    /// A header with the wrong magic does not fail here, the archive is returned with
    /// [`MpqArchive::is_valid`] unset instead. I/O errors while parsing always fail.
    #[instrument(skip_all, err)]
    pub fn new(mut reader: R) -> Result<MpqArchive<R>> {
        let id = ArchiveId::next();
        let header = MpqHeader::read(&mut reader)?;
        let valid = header.is_valid();

        let entries = if valid {
            Self::get_entries(&mut reader, &header, id)?
        } else {
            error!(
                "archive magic {:?} is not matched, maybe the file is not an mpyq archive",
                header.magic
            );
            Self::get_entries(&mut reader, &header, id).unwrap_or_else(|e| {
                warn!("unable to read the directory of an invalid archive: {e}");
                Vec::new()
            })
        };

        let mut names: HashMap<String, Vec<usize>> = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            names.entry(entry.key.clone()).or_default().push(index);
        }

        Ok(MpqArchive {
            id,
            reader: Mutex::new(reader),
            header,
            valid,
            entries,
            names,
            table: HashTable::shared(),
        })
    }

    fn get_entries(reader: &mut R, header: &MpqHeader, id: ArchiveId) -> Result<Vec<MpqEntry>> {
        let count = usize::try_from(header.entry_count).map_err(|_| {
            Error::CustomError(format!("negative entry count {}", header.entry_count))
        })?;

        let mut entries = Vec::with_capacity(count.min(0x1000));
        for _ in 0..count {
            let record = MpqEntryRecord::read(reader)?;
            debug!(
                "read an entry: {}; hash_a: {}; hash_b: {}",
                record.key, record.hash_a, record.hash_b
            );
            entries.push(MpqEntry::from_record(id, record));
        }

        Ok(entries)
    }

    /// Read the whole payload of `name`.
    ///
    /// Fails with [`Error::InvalidArchive`] on an invalid archive and with
    /// [`Error::FileNotFound`] when no entry passes [`MpqArchive::find`].
    #[instrument(skip(self), err)]
    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let index = self.lookup(name)?;
        self.read_entry(&self.entries[index])
    }

    fn read_entry(&self, entry: &MpqEntry) -> Result<Vec<u8>> {
        let start = self.data_start(entry)?;
        let mut reader = self.reader.lock().map_err(|_| Error::LockPoisoned)?;
        reader.seek(SeekFrom::Start(start))?;

        let mut data = Vec::new();
        (&mut *reader).take(entry.file_size).read_to_end(&mut data)?;
        if (data.len() as u64) < entry.file_size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "read {} of {} bytes for {}",
                    data.len(),
                    entry.file_size,
                    entry.key
                ),
            )
            .into());
        }

        Ok(data)
    }

    /// Open a file by name for streaming.
    pub fn by_name(&mut self, name: &str) -> Result<MpqFile<'_, R>> {
        let index = self.lookup(name)?;
        self.open_entry(index)
    }

    /// Open a file by its position in the directory for streaming.
    pub fn by_index(&mut self, index: usize) -> Result<MpqFile<'_, R>> {
        if !self.valid {
            return Err(Error::InvalidArchive);
        }
        if index >= self.entries.len() {
            return Err(FileNotFoundError::Index(index).into());
        }
        self.open_entry(index)
    }

    fn open_entry(&mut self, index: usize) -> Result<MpqFile<'_, R>> {
        let start = self.data_start(&self.entries[index])?;
        let reader = self.reader.get_mut().map_err(|_| Error::LockPoisoned)?;
        reader.seek(SeekFrom::Start(start))?;

        let entry = &self.entries[index];
        Ok(MpqFile {
            entry,
            reader,
            remaining: entry.file_size,
        })
    }

    /// Check the payload of `name` against its recorded MD5 digest.
    #[instrument(skip(self), err)]
    pub fn verify(&self, name: &str) -> Result<()> {
        let index = self.lookup(name)?;
        let entry = &self.entries[index];
        match checksum::check(entry, &self.read_entry(entry)?) {
            Some(mismatch) => Err(mismatch.into()),
            None => Ok(()),
        }
    }

    /// Check every payload against its recorded digest, returning the ones that differ.
    #[instrument(skip(self), err)]
    pub fn verify_all(&self) -> Result<Vec<Mismatch>> {
        if !self.valid {
            return Err(Error::InvalidArchive);
        }

        let mut mismatches = Vec::new();
        for entry in &self.entries {
            if let Some(mismatch) = checksum::check(entry, &self.read_entry(entry)?) {
                warn!("checksum mismatch for {}", entry.key);
                mismatches.push(mismatch);
            }
        }
        Ok(mismatches)
    }

    /// Write the payload of `name` to the file `target`, creating its parent directories.
    #[instrument(skip(self, target), fields(target = %target.as_ref().display()), err)]
    pub fn extract_file(&self, name: &str, target: impl AsRef<Path>) -> Result<()> {
        let data = self.read_file(name)?;
        write_file(target.as_ref(), &data)
    }

    /// Extract every entry into `directory`, each one at `<directory>/<key>`.
    ///
    /// Keys that are absolute or climb out of `directory` fail with [`Error::UnsafePath`].
    /// Returns the number of files written.
    #[instrument(skip(self, directory), fields(directory = %directory.as_ref().display()), err)]
    pub fn extract_all(&self, directory: impl AsRef<Path>) -> Result<usize> {
        if !self.valid {
            return Err(Error::InvalidArchive);
        }

        let directory = directory.as_ref();
        for entry in &self.entries {
            let target = enclosed_path(directory, &entry.key)?;
            self.extract_file(&entry.key, target)?;
        }

        Ok(self.entries.len())
    }
}

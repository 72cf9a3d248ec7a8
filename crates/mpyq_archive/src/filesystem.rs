//! Overlay of many archives into a single namespace.
//!
//! Resource updates are shipped as additional archives next to the base ones. When the same name
//! appears in more than one archive, the entry with the newest `file_date` is served, whatever
//! the order in which the archives were found.

use bon::Builder;
use indexmap::{map::Entry, IndexMap};
use std::{
    collections::HashMap,
    ffi::OsStr,
    fs::{self, File},
    io::{Read, Seek},
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, instrument, warn};
use walkdir::WalkDir;

use crate::{
    checksum::{self, Mismatch},
    error::{Error, FileNotFoundError, Result},
    extract::{enclosed_path, write_file, ExtractMode},
    read::MpqArchive,
    types::{ArchiveId, MpqEntry},
};

/// Options controlling how [`MpqFileSystem::init`] discovers archives
#[derive(Debug, Clone, Builder)]
pub struct MpqFileSystemOptions {
    /// Files whose extension ends with this, ignoring case, are loaded as archives
    #[builder(into, default = String::from("mpq"))]
    pub extension: String,

    /// Descend into symbolically linked directories while walking the directory tree
    ///
    /// Links pointing at archive files are loaded either way.
    #[builder(default)]
    pub follow_links: bool,

    /// Maximum depth to descend below the root, unlimited when unset
    pub max_depth: Option<usize>,
}

impl Default for MpqFileSystemOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MpqFileSystemOptions {
    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| {
                ext.to_lowercase()
                    .ends_with(&self.extension.to_lowercase())
            })
    }
}

/// A set of archives merged into one lookup table
///
/// ```no_run
/// fn read_config() -> mpyq_archive::error::Result<Vec<u8>> {
///     let mut fs: mpyq_archive::MpqFileSystem = mpyq_archive::MpqFileSystem::new();
///     fs.init("res/mpq")?;
///
///     fs.read_data("config/game.json")
/// }
/// ```
pub struct MpqFileSystem<R = File> {
    options: MpqFileSystemOptions,
    archives: IndexMap<PathBuf, MpqArchive<R>>,
    owners: HashMap<ArchiveId, usize>,
    entries: IndexMap<String, MpqEntry>,
}

impl<R> std::fmt::Debug for MpqFileSystem<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpqFileSystem")
            .field("options", &self.options)
            .field("archives", &self.archives.keys().collect::<Vec<_>>())
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl<R> Default for MpqFileSystem<R> {
    fn default() -> Self {
        Self::with_options(MpqFileSystemOptions::default())
    }
}

impl<R> MpqFileSystem<R> {
    /// An empty file system looking for `.mpq` archives.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty file system with the given discovery options.
    pub fn with_options(options: MpqFileSystemOptions) -> Self {
        Self {
            options,
            archives: IndexMap::new(),
            owners: HashMap::new(),
            entries: IndexMap::new(),
        }
    }

    /// Number of distinct file names served
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no file is served
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The winning entry for `name`, if any archive provides it.
    pub fn get(&self, name: &str) -> Option<&MpqEntry> {
        self.entries.get(name)
    }

    /// Whether `name` is provided by any archive.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The winning entries, in the order their names were first seen.
    pub fn entries(&self) -> impl Iterator<Item = &MpqEntry> {
        self.entries.values()
    }

    /// The loaded archives keyed by their absolute path, in load order.
    pub fn archives(&self) -> impl Iterator<Item = (&Path, &MpqArchive<R>)> {
        self.archives.iter().map(|(path, archive)| (path.as_path(), archive))
    }

    /// The archive an entry was read from.
    pub fn archive_of(&self, entry: &MpqEntry) -> Option<&MpqArchive<R>> {
        self.owners
            .get(&entry.archive)
            .and_then(|&index| self.archives.get_index(index))
            .map(|(_, archive)| archive)
    }

    /// Add a valid archive to the overlay and merge its directory.
    ///
    /// An archive already loaded from the same path is kept and `archive` is discarded.
    #[instrument(skip(self, archive), fields(path = %path.display()), err)]
    pub fn insert(&mut self, path: PathBuf, archive: MpqArchive<R>) -> Result<()> {
        if !archive.is_valid() {
            error!("the archive is not valid: {}", path.display());
            return Err(Error::InvalidArchive);
        }

        self.commit(path, archive);
        Ok(())
    }

    fn commit(&mut self, path: PathBuf, archive: MpqArchive<R>) {
        if self.archives.contains_key(&path) {
            debug!("archive already loaded: {}", path.display());
            return;
        }

        for index in 0..archive.len() {
            if let Some(entry) = archive.entry(index) {
                self.put(entry.clone());
            }
        }

        self.owners.insert(archive.id(), self.archives.len());
        self.archives.insert(path, archive);
    }

    /// Register `entry` unless a newer or equally old entry already owns its name.
    ///
    /// Returns whether the entry was registered.
    fn put(&mut self, entry: MpqEntry) -> bool {
        match self.entries.entry(entry.key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
            Entry::Occupied(mut slot) => {
                if slot.get().file_date < entry.file_date {
                    debug!("update newer file: {}", entry.key);
                    slot.insert(entry);
                    true
                } else {
                    debug!("ignore older file: {}", entry.key);
                    false
                }
            }
        }
    }

    /// Drop every archive and forget every entry.
    pub fn close(&mut self) {
        self.entries.clear();
        self.owners.clear();
        self.archives.clear();
    }
}

impl MpqFileSystem<File> {
    /// Load every archive found below `root`.
    ///
    /// All files of a directory are visited before its subdirectories. If any matching file
    /// fails to open or is not a valid archive the whole call fails and nothing found during it
    /// is merged.
    #[instrument(skip(self, root), fields(root = %root.as_ref().display()), err)]
    pub fn init(&mut self, root: impl AsRef<Path>) -> Result<()> {
        let root = root.as_ref();

        let mut walker = WalkDir::new(root)
            .follow_links(self.options.follow_links)
            .sort_by(|a, b| a.file_type().is_dir().cmp(&b.file_type().is_dir()));
        if let Some(depth) = self.options.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut loaded = Vec::new();
        for item in walker {
            let item = item.map_err(|e| Error::InitFailure {
                path: e.path().unwrap_or(root).to_path_buf(),
                source: Box::new(std::io::Error::from(e).into()),
            })?;

            let is_file = item.file_type().is_file()
                || (item.path_is_symlink() && item.path().is_file());
            if !is_file || !self.options.matches(item.path()) {
                continue;
            }

            let path = item.path();
            let archive = Self::load(path).map_err(|e| Error::InitFailure {
                path: path.to_path_buf(),
                source: Box::new(e),
            })?;
            loaded.push(archive);
        }

        info!("loaded {} archives", loaded.len());
        for (path, archive) in loaded {
            self.commit(path, archive);
        }

        Ok(())
    }

    fn load(path: &Path) -> Result<(PathBuf, MpqArchive<File>)> {
        let path = fs::canonicalize(path)?;
        let archive = MpqArchive::open(&path)?;

        if !archive.is_valid() {
            error!("the archive is not valid: {}", path.display());
            return Err(Error::InvalidArchive);
        }

        debug!("opened {} with {} entries", path.display(), archive.len());
        Ok((path, archive))
    }
}

impl<R: Read + Seek> MpqFileSystem<R> {
    /// Read the winning payload for `name`.
    #[instrument(skip(self), err)]
    pub fn read_data(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| FileNotFoundError::Name(name.to_owned()))?;

        self.archive_of(entry)
            .ok_or_else(|| FileNotFoundError::Name(name.to_owned()))?
            .read_file(name)
    }

    /// Flatten the overlay into `directory`, returning the number of files written.
    ///
    /// With [`ExtractMode::PerArchive`] the on disk result depends on load order rather than on
    /// entry dates, use [`ExtractMode::Resolved`] to get exactly what [`Self::read_data`] serves.
    #[instrument(skip(self, directory), fields(directory = %directory.as_ref().display()), err)]
    pub fn extract_all(&self, directory: impl AsRef<Path>, mode: ExtractMode) -> Result<usize> {
        let directory = directory.as_ref();

        match mode {
            ExtractMode::PerArchive => {
                let mut written = 0;
                for archive in self.archives.values() {
                    written += archive.extract_all(directory)?;
                }
                Ok(written)
            }
            ExtractMode::Resolved => {
                for entry in self.entries.values() {
                    let target = enclosed_path(directory, &entry.key)?;
                    write_file(&target, &self.read_data(&entry.key)?)?;
                }
                Ok(self.entries.len())
            }
        }
    }

    /// Check every served payload against its recorded digest.
    #[instrument(skip(self), err)]
    pub fn verify(&self) -> Result<Vec<Mismatch>> {
        let mut mismatches = Vec::new();
        for entry in self.entries.values() {
            let data = self.read_data(&entry.key)?;
            if let Some(mismatch) = checksum::check(entry, &data) {
                warn!("checksum mismatch for {}", entry.key);
                mismatches.push(mismatch);
            }
        }
        Ok(mismatches)
    }
}

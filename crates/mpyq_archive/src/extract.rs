//! Helpers for writing archive members to disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// How [`crate::MpqFileSystem::extract_all`] flattens overlapping archives onto disk
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ExtractMode {
    /// Extract every archive in load order, a later archive overwrites files written by an
    /// earlier one regardless of their dates
    #[default]
    PerArchive,

    /// Only write the entry that wins the overlay for each name
    Resolved,
}

/// Join an entry key onto `root`, refusing keys that would land outside of it.
///
/// Both `/` and `\` are accepted as separators.
pub fn enclosed_path(root: &Path, key: &str) -> Result<PathBuf> {
    if key.starts_with(&['/', '\\'][..]) {
        return Err(Error::UnsafePath(key.to_owned()));
    }

    let mut path = root.to_path_buf();
    let mut depth = 0;
    for part in key.split(&['/', '\\'][..]) {
        match part {
            "" | "." => continue,
            ".." => return Err(Error::UnsafePath(key.to_owned())),
            part if part.contains(':') => return Err(Error::UnsafePath(key.to_owned())),
            part => {
                path.push(part);
                depth += 1;
            }
        }
    }

    if depth == 0 {
        return Err(Error::UnsafePath(key.to_owned()));
    }

    Ok(path)
}

/// Write `data` to `target`, creating any missing parent directories.
pub(crate) fn write_file(target: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    debug!("writing {}", target.display());
    fs::write(target, data)?;

    Ok(())
}

//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file is an invalid mpyq archive
    #[error("file is an invalid mpyq archive")]
    #[diagnostic(help("the first four bytes of the file must be `MPYQ`"))]
    InvalidArchive,

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),

    /// unable to load archive {path}
    #[error("unable to load archive {path}")]
    InitFailure {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// checksum mismatch for {name}
    #[error("checksum mismatch for {name}: expected {expected}, found {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// entry name {0} would be extracted outside of the target directory
    #[error("entry name {0} would be extracted outside of the target directory")]
    UnsafePath(String),

    /// archive reader lock was poisoned
    #[error("archive reader lock was poisoned")]
    LockPoisoned,

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

impl Error {
    /// Whether this error is a recoverable lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::FileNotFound(_))
    }
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;

//! Error types for every encryption and decryption operation.
//!
//! Each variant maps to a stable, machine-readable [`ErrorKind`] so that an
//! outer layer can distinguish "bad key or file" from "disk problem" without
//! parsing messages.

use std::io;
use std::path::{Path, PathBuf};

use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// The error type for all file encryption operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A file could not be opened, read, created or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// The path the failing operation touched.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Key text was not valid base64 or decoded to an unsupported length.
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// The encrypted file is too short to contain an initialization vector.
    #[error("{}: truncated input, expected at least {expected} bytes but found {actual}", path.display())]
    CorruptInput { path: PathBuf, expected: usize, actual: usize },

    /// The cipher rejected the data during finalization.
    ///
    /// Either the key is wrong or the ciphertext was corrupted.
    #[error("{}: decryption failed, wrong key or corrupted data", path.display())]
    DecryptionFailed { path: PathBuf },

    /// The encryption stream failed after the files were opened.
    #[error("{}: encryption failed: {source}", path.display())]
    EncryptionFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A background task running an operation panicked or was cancelled.
    #[error("worker failed: {0}")]
    Worker(String),
}

/// Machine-readable classification of an [`Error`].
///
/// The string form (`IO_ERROR`, `DECRYPTION_FAILED`, ...) is stable and is
/// what crosses the boundary to callers in other runtimes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    IoError,
    InvalidKeyEncoding,
    CorruptInput,
    DecryptionFailed,
    EncryptionFailed,
    WorkerFailed,
}

impl ErrorKind {
    /// Returns the stable error code.
    #[inline]
    pub fn code(self) -> &'static str {
        self.into()
    }
}

impl Error {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::IoError,
            Self::InvalidKeyEncoding(_) => ErrorKind::InvalidKeyEncoding,
            Self::CorruptInput { .. } => ErrorKind::CorruptInput,
            Self::DecryptionFailed { .. } => ErrorKind::DecryptionFailed,
            Self::EncryptionFailed { .. } => ErrorKind::EncryptionFailed,
            Self::Worker(_) => ErrorKind::WorkerFailed,
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }

    pub(crate) fn encryption(path: &Path, source: io::Error) -> Self {
        Self::EncryptionFailed { path: path.to_path_buf(), source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

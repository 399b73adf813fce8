//! Common type definitions.
//!
//! - [`ProcessorMode`]: what the user asked for (encrypt or decrypt a file)
//! - [`Processing`]: the cipher direction of an operation in progress
//! - [`CipherStreamJob`]: one operation, from opening the source to committing
//!   the destination

use std::fmt::{Display, Formatter, Result};
use std::path::{Path, PathBuf};

use crate::cipher::SymmetricKey;

/// Represents the type of file operation to perform.
///
/// Used to derive default output paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessorMode {
    /// Encrypt the file, producing a `.enc` output.
    Encrypt,

    /// Decrypt the file, removing the `.enc` extension.
    Decrypt,
}

impl ProcessorMode {
    /// Returns a human-readable label for the mode.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Encrypt => "Encrypt",
            Self::Decrypt => "Decrypt",
        }
    }
}

impl Display for ProcessorMode {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.label())
    }
}

/// The direction a cipher runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Processing {
    Encryption,
    Decryption,
}

impl Processing {
    /// Returns a progress label for the operation.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Encryption => "Encrypting...",
            Self::Decryption => "Decrypting...",
        }
    }

    /// Converts a `Processing` to its corresponding `ProcessorMode`.
    #[inline]
    pub fn mode(self) -> ProcessorMode {
        match self {
            Self::Encryption => ProcessorMode::Encrypt,
            Self::Decryption => ProcessorMode::Decrypt,
        }
    }
}

impl Display for Processing {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.label())
    }
}

/// A single encryption or decryption operation.
///
/// Created when an operation starts and dropped when it ends; the key it
/// owns is zeroized with it. Nothing carries over between jobs.
#[derive(Debug)]
pub struct CipherStreamJob {
    direction: Processing,
    source: PathBuf,
    destination: PathBuf,
    key: SymmetricKey,
}

impl CipherStreamJob {
    pub fn new(direction: Processing, source: impl Into<PathBuf>, destination: impl Into<PathBuf>, key: SymmetricKey) -> Self {
        Self { direction, source: source.into(), destination: destination.into(), key }
    }

    #[inline]
    pub fn direction(&self) -> Processing {
        self.direction
    }

    #[inline]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[inline]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    #[inline]
    pub fn key(&self) -> &SymmetricKey {
        &self.key
    }

    /// Consumes the job, handing the key back to the caller.
    #[inline]
    pub fn into_key(self) -> SymmetricKey {
        self.key
    }
}

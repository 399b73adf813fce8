//! Path handling for the command-line front end.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{DECRYPTED_EXTENSION, FILE_EXTENSION};
use crate::types::ProcessorMode;

/// A file the CLI reads from or writes to.
///
/// The size is looked up lazily and cached, since the summary table asks for
/// it after the operation has completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    path: PathBuf,
    size: Option<u64>,
}

impl File {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), size: None }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes, read from metadata on first call.
    pub fn size(&mut self) -> Result<u64> {
        if let Some(size) = self.size {
            return Ok(size);
        }

        let size = fs::metadata(&self.path).with_context(|| format!("failed to get metadata: {}", self.path.display()))?.len();
        self.size = Some(size);

        Ok(size)
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn is_encrypted(&self) -> bool {
        self.path.to_string_lossy().ends_with(FILE_EXTENSION)
    }

    /// Default destination when none is given on the command line.
    ///
    /// Encryption appends the extension. Decryption strips it, or appends
    /// `.dec` when it is absent so the source is never the destination.
    pub fn output_path(&self, mode: ProcessorMode) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();

        match mode {
            ProcessorMode::Encrypt => {
                name.push(FILE_EXTENSION);
                PathBuf::from(name)
            }

            ProcessorMode::Decrypt => match self.path.to_string_lossy().strip_suffix(FILE_EXTENSION) {
                Some(stem) if !stem.is_empty() => PathBuf::from(stem),
                _ => {
                    name.push(DECRYPTED_EXTENSION);
                    PathBuf::from(name)
                }
            },
        }
    }

    /// Checks that the file can serve as an operation's input.
    pub fn validate(&self) -> Result<()> {
        let metadata = fs::metadata(&self.path).with_context(|| format!("file not found: {}", self.path.display()))?;
        anyhow::ensure!(metadata.is_file(), "not a regular file: {}", self.path.display());
        Ok(())
    }
}

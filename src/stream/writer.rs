//! Atomic output writing.
//!
//! Output goes to a temporary file next to the destination and is renamed
//! over it only once the whole stream succeeded. A failed or abandoned
//! operation therefore never leaves a partial file at the destination path;
//! dropping an uncommitted [`Writer`] deletes the temporary file along with any
//! parent directories [`Writer::create`] had to make.

use std::fs;
use std::io::{BufWriter, Result, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Buffered writer that publishes its file on [`commit`](Self::commit).
pub struct Writer {
    inner: BufWriter<NamedTempFile>,
    created: CreatedDirs,
    destination: PathBuf,
    permissions: Option<fs::Permissions>,
    written: u64,
}

/// Directories made for the destination, removed again unless committed.
struct CreatedDirs {
    leaf: PathBuf,
    top: Option<PathBuf>,
}

impl CreatedDirs {
    fn keep(mut self) {
        self.top = None;
    }
}

impl Drop for CreatedDirs {
    fn drop(&mut self) {
        let Some(top) = self.top.take() else { return };

        for dir in self.leaf.ancestors() {
            if fs::remove_dir(dir).is_err() || dir == top {
                break;
            }
        }
    }
}

impl Writer {
    /// Creates the temporary file in the destination's directory.
    ///
    /// Missing parent directories are created.
    pub fn create(destination: &Path) -> Result<Self> {
        let parent = destination.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));

        let top = parent.ancestors().take_while(|p| !p.as_os_str().is_empty() && !p.exists()).last().map(Path::to_path_buf);
        let created = CreatedDirs { leaf: parent.to_path_buf(), top };
        if created.top.is_some() {
            fs::create_dir_all(parent)?;
        }

        let file = NamedTempFile::new_in(parent)?;

        Ok(Self { inner: BufWriter::new(file), created, destination: destination.to_path_buf(), permissions: None, written: 0 })
    }

    /// Permissions the file is published with.
    ///
    /// Without this the file keeps the owner-only mode of its temporary.
    #[must_use]
    pub fn with_permissions(mut self, permissions: fs::Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Total bytes written so far.
    #[inline]
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flushes, syncs and atomically moves the file to its destination.
    pub fn commit(self) -> Result<()> {
        let file = self.inner.into_inner().map_err(std::io::IntoInnerError::into_error)?;
        file.as_file().sync_all()?;
        if let Some(permissions) = self.permissions {
            file.as_file().set_permissions(permissions)?;
        }

        file.persist(&self.destination).map_err(|e| e.error)?;
        self.created.keep();
        Ok(())
    }
}

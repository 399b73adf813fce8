//! Chunked input reading.
//!
//! Short reads are normal for pipes and some filesystems, so every read here
//! keeps pulling until the buffer is full or the source hits end-of-stream.

use std::io::{ErrorKind, Read, Result};
use std::num::NonZeroUsize;

use crate::config::IV_SIZE;

/// Reads a source in fixed-size chunks through one reusable buffer.
pub struct Reader<R> {
    inner: R,
    buffer: Vec<u8>,
}

impl<R: Read> Reader<R> {
    pub fn new(inner: R, chunk_size: NonZeroUsize) -> Self {
        Self { inner, buffer: vec![0u8; chunk_size.get()] }
    }

    /// Reads the initialization vector at the start of an encrypted file.
    ///
    /// Returns the IV together with the number of bytes actually available,
    /// which is less than [`IV_SIZE`] only for a truncated source.
    pub fn read_iv(&mut self) -> Result<([u8; IV_SIZE], usize)> {
        let mut iv = [0u8; IV_SIZE];
        let filled = fill(&mut self.inner, &mut iv)?;
        Ok((iv, filled))
    }

    /// Reads the next chunk, returning `None` at end-of-stream.
    ///
    /// Every chunk but the last is exactly the configured size.
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        let filled = fill(&mut self.inner, &mut self.buffer)?;
        if filled == 0 {
            return Ok(None);
        }

        Ok(Some(&self.buffer[..filled]))
    }
}

/// Reads until `buf` is full or the source is exhausted.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}

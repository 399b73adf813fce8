//! High-level file encryption and decryption operations.
//!
//! This is the boundary a host application calls into: paths and key text go
//! in, an encoded key or a classified [`ErrorReport`] comes out. The async
//! [`Processor`] runs each operation on tokio's blocking pool so that a
//! caller's event loop never waits on file I/O.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task;
use tracing::warn;

use crate::cipher::{OsRandom, SecureRandom, decode_key, encode_key};
use crate::config::IV_SIZE;
use crate::error::{Error, Result};
use crate::stream::Pipeline;
use crate::types::Processing;
use crate::ui::progress::Bar;

/// Encrypts `input` into `output` and returns the base64-encoded key.
pub fn encrypt_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<String> {
    let key = Pipeline::new().encrypt(input.as_ref(), output.as_ref(), None)?;
    Ok(encode_key(&key))
}

/// Decrypts `input` into `output` with a base64-encoded key.
pub fn decrypt_file(key: &str, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    Pipeline::new().decrypt(input.as_ref(), output.as_ref(), decode_key(key)?, None)
}

/// Failure as reported across the boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorReport {
    /// Stable machine-readable kind, e.g. `DECRYPTION_FAILED`.
    pub code: &'static str,
    /// Human-readable description including the failing path.
    pub message: String,
}

impl From<&Error> for ErrorReport {
    fn from(error: &Error) -> Self {
        Self { code: error.kind().code(), message: error.to_string() }
    }
}

impl From<Error> for ErrorReport {
    fn from(error: Error) -> Self {
        Self::from(&error)
    }
}

/// Async front end over a shared [`Pipeline`].
pub struct Processor<G = OsRandom> {
    pipeline: Arc<Pipeline<G>>,
    progress: bool,
}

impl Processor {
    pub fn new() -> Self {
        Self::with_pipeline(Pipeline::new())
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> Clone for Processor<G> {
    fn clone(&self) -> Self {
        Self { pipeline: Arc::clone(&self.pipeline), progress: self.progress }
    }
}

impl<G: SecureRandom + 'static> Processor<G> {
    /// Uses `pipeline` for every operation.
    pub fn with_pipeline(pipeline: Pipeline<G>) -> Self {
        Self { pipeline: Arc::new(pipeline), progress: false }
    }

    /// Renders a progress bar on the terminal while operations run.
    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Encrypts `input` into `output`, returning the encoded key.
    pub async fn encrypt(&self, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Result<String> {
        let (input, output) = (input.into(), output.into());
        let (pipeline, progress) = (Arc::clone(&self.pipeline), self.progress);

        let key = spawn(move || {
            let bar = progress.then(|| progress_bar(&input, Processing::Encryption));
            pipeline.encrypt(&input, &output, bar.as_ref()).inspect(|_| finish(bar.as_ref())).inspect_err(|_| abandon(bar.as_ref()))
        })
        .await?;

        Ok(encode_key(&key))
    }

    /// Decrypts `input` into `output` with the encoded `key`.
    pub async fn decrypt(&self, key: &str, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Result<()> {
        let key = decode_key(key)?;
        let (input, output) = (input.into(), output.into());
        let (pipeline, progress) = (Arc::clone(&self.pipeline), self.progress);

        spawn(move || {
            let bar = progress.then(|| progress_bar(&input, Processing::Decryption));
            pipeline.decrypt(&input, &output, key, bar.as_ref()).inspect(|()| finish(bar.as_ref())).inspect_err(|_| abandon(bar.as_ref()))
        })
        .await
    }
}

fn progress_bar(input: &Path, processing: Processing) -> Bar {
    let size = fs::metadata(input).map(|m| m.len()).unwrap_or_default();
    let total = match processing {
        Processing::Encryption => size,
        Processing::Decryption => size.saturating_sub(IV_SIZE as u64),
    };

    Bar::new(total, processing.label())
}

fn finish(bar: Option<&Bar>) {
    if let Some(bar) = bar {
        bar.finish();
    }
}

fn abandon(bar: Option<&Bar>) {
    if let Some(bar) = bar {
        bar.abandon();
    }
}

/// Runs `operation` on the blocking pool.
async fn spawn<T, F>(operation: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    task::spawn_blocking(operation).await.map_err(|e| {
        warn!(error = %e, "blocking task failed");
        Error::Worker(e.to_string())
    })?
}

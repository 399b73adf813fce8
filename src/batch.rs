//! Parallel processing of independent files.
//!
//! Each job is a complete encrypt or decrypt operation with its own key and
//! IV. Jobs run on rayon's global pool and one failure does not stop the
//! others; results come back in the order the jobs were given. Destinations
//! must be distinct.

use std::path::PathBuf;

use rayon::prelude::*;
use tracing::debug;

use crate::cipher::{SecureRandom, decode_key, encode_key};
use crate::error::Result;
use crate::stream::Pipeline;

/// Encrypts every `(source, destination)` pair, returning one encoded key or
/// error per pair.
pub fn encrypt_batch<G: SecureRandom>(pipeline: &Pipeline<G>, jobs: &[(PathBuf, PathBuf)]) -> Vec<Result<String>> {
    debug!(jobs = jobs.len(), "starting encryption batch");

    jobs.par_iter().map(|(source, destination)| pipeline.encrypt(source, destination, None).map(|key| encode_key(&key))).collect()
}

/// Decrypts every `(key, source, destination)` triple.
pub fn decrypt_batch<G: SecureRandom>(pipeline: &Pipeline<G>, jobs: &[(String, PathBuf, PathBuf)]) -> Vec<Result<()>> {
    debug!(jobs = jobs.len(), "starting decryption batch");

    jobs.par_iter().map(|(key, source, destination)| pipeline.decrypt(source, destination, decode_key(key)?, None)).collect()
}

//! Streaming file encryption and decryption.
//!
//! A [`Pipeline`] turns one source file into one destination file, one chunk
//! at a time:
//!
//! ```text
//! encrypt: source --chunks--> Cipher --> [IV][ciphertext] --> destination
//! decrypt: source --[IV]--> Cipher init, --chunks--> Cipher --> destination
//! ```
//!
//! Each operation moves through `opened -> streaming -> finalizing -> closed`
//! and is traced at debug level. Files are closed on every exit path by
//! ownership, and the destination only appears after a successful finalize.

use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use bytesize::ByteSize;
use tracing::{debug, info, instrument, trace};

pub mod reader;
pub mod writer;

use crate::cipher::{Cipher, KeySize, OsRandom, SecureRandom, SymmetricKey, generate_key};
use crate::config::{CHUNK_SIZE, IV_SIZE};
use crate::error::{Error, Result};
use crate::stream::reader::Reader;
use crate::stream::writer::Writer;
use crate::types::{CipherStreamJob, Processing};
use crate::ui::progress::Bar;

/// Runs encrypt and decrypt operations over files.
///
/// A pipeline holds no per-operation state and can be shared between threads;
/// concurrent operations must use distinct destination paths.
pub struct Pipeline<G = OsRandom> {
    random: G,
    chunk_size: NonZeroUsize,
    key_size: KeySize,
}

impl Pipeline {
    /// Creates a pipeline backed by the operating system's random source.
    pub fn new() -> Self {
        Self::with_random(OsRandom)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: SecureRandom> Pipeline<G> {
    /// Creates a pipeline that draws keys and IVs from `random`.
    pub fn with_random(random: G) -> Self {
        let chunk_size = NonZeroUsize::new(CHUNK_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self { random, chunk_size, key_size: KeySize::default() }
    }

    /// Sets the read chunk size. Output bytes do not depend on it.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: NonZeroUsize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the size of generated keys.
    #[must_use]
    pub fn with_key_size(mut self, key_size: KeySize) -> Self {
        self.key_size = key_size;
        self
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.get()
    }

    /// Encrypts `source` into `destination` under a freshly generated key.
    ///
    /// The destination receives the random IV followed by the ciphertext. The
    /// key is returned only on success and is never logged.
    pub fn encrypt(&self, source: &Path, destination: &Path, progress: Option<&Bar>) -> Result<SymmetricKey> {
        let key = generate_key(&self.random, self.key_size).map_err(|e| Error::encryption(destination, e))?;

        let mut iv = [0u8; IV_SIZE];
        self.random.fill(&mut iv).map_err(|e| Error::encryption(destination, e))?;

        let job = CipherStreamJob::new(Processing::Encryption, source, destination, key);
        self.run_encrypt(&job, &iv, progress)?;

        Ok(job.into_key())
    }

    /// Decrypts `source` into `destination` with `key`.
    pub fn decrypt(&self, source: &Path, destination: &Path, key: SymmetricKey, progress: Option<&Bar>) -> Result<()> {
        let job = CipherStreamJob::new(Processing::Decryption, source, destination, key);
        self.run_decrypt(&job, progress)
    }

    /// Runs a prepared job.
    ///
    /// Encryption jobs draw a fresh IV from the pipeline's random source.
    pub fn execute(&self, job: &CipherStreamJob, progress: Option<&Bar>) -> Result<()> {
        match job.direction() {
            Processing::Encryption => {
                let mut iv = [0u8; IV_SIZE];
                self.random.fill(&mut iv).map_err(|e| Error::encryption(job.destination(), e))?;
                self.run_encrypt(job, &iv, progress)
            }
            Processing::Decryption => self.run_decrypt(job, progress),
        }
    }

    #[instrument(skip_all, fields(source = %job.source().display(), destination = %job.destination().display()))]
    fn run_encrypt(&self, job: &CipherStreamJob, iv: &[u8; IV_SIZE], progress: Option<&Bar>) -> Result<()> {
        let (source, destination) = (job.source(), job.destination());

        let input = fs::File::open(source).map_err(|e| Error::io(source, e))?;
        let metadata = input.metadata().map_err(|e| Error::io(source, e))?;
        let mut reader = Reader::new(input, self.chunk_size);
        let mut writer = Writer::create(destination).map_err(|e| Error::io(destination, e))?.with_permissions(metadata.permissions());
        debug!(size = %ByteSize::b(metadata.len()), "opened");

        let mut cipher = Cipher::new(Processing::Encryption, job.key(), iv)?;
        writer.write_all(iv).map_err(|e| Error::encryption(destination, e))?;
        trace!(iv = %hex::encode(iv), "wrote initialization vector");

        debug!(chunk_size = self.chunk_size.get(), "streaming");
        let mut output = Vec::with_capacity(self.chunk_size.get() + IV_SIZE);
        let mut consumed = 0u64;
        while let Some(chunk) = reader.next_chunk().map_err(|e| Error::encryption(source, e))? {
            cipher.update(chunk, &mut output);
            writer.write_all(&output).map_err(|e| Error::encryption(destination, e))?;

            consumed += chunk.len() as u64;
            if let Some(bar) = progress {
                bar.add(chunk.len() as u64);
            }
        }

        debug!("finalizing");
        output.clear();
        cipher.finalize(&mut output).map_err(|_| Error::encryption(destination, std::io::Error::other("cipher finalization failed")))?;
        writer.write_all(&output).map_err(|e| Error::encryption(destination, e))?;

        let written = writer.written();
        writer.commit().map_err(|e| Error::encryption(destination, e))?;

        info!(plaintext = %ByteSize::b(consumed), ciphertext = %ByteSize::b(written), "encrypted");
        Ok(())
    }

    #[instrument(skip_all, fields(source = %job.source().display(), destination = %job.destination().display()))]
    fn run_decrypt(&self, job: &CipherStreamJob, progress: Option<&Bar>) -> Result<()> {
        let (source, destination) = (job.source(), job.destination());

        let input = fs::File::open(source).map_err(|e| Error::io(source, e))?;
        let metadata = input.metadata().map_err(|e| Error::io(source, e))?;
        let mut reader = Reader::new(input, self.chunk_size);
        debug!(size = %ByteSize::b(metadata.len()), "opened");

        let (iv, filled) = reader.read_iv().map_err(|e| Error::io(source, e))?;
        if filled < IV_SIZE {
            return Err(Error::CorruptInput { path: source.to_path_buf(), expected: IV_SIZE, actual: filled });
        }
        trace!(iv = %hex::encode(iv), "read initialization vector");

        let mut cipher = Cipher::new(Processing::Decryption, job.key(), &iv)?;
        let mut writer = Writer::create(destination).map_err(|e| Error::io(destination, e))?.with_permissions(metadata.permissions());

        debug!(chunk_size = self.chunk_size.get(), "streaming");
        let mut output = Vec::with_capacity(self.chunk_size.get() + IV_SIZE);
        let mut consumed = IV_SIZE as u64;
        while let Some(chunk) = reader.next_chunk().map_err(|e| Error::io(source, e))? {
            cipher.update(chunk, &mut output);
            writer.write_all(&output).map_err(|e| Error::io(destination, e))?;

            consumed += chunk.len() as u64;
            if let Some(bar) = progress {
                bar.add(chunk.len() as u64);
            }
        }

        debug!("finalizing");
        output.clear();
        cipher.finalize(&mut output).map_err(|_| Error::DecryptionFailed { path: source.to_path_buf() })?;
        writer.write_all(&output).map_err(|e| Error::io(destination, e))?;

        let written = writer.written();
        writer.commit().map_err(|e| Error::io(destination, e))?;

        info!(ciphertext = %ByteSize::b(consumed), plaintext = %ByteSize::b(written), "decrypted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::cipher::{decode_key, encode_key};
    use crate::config::BLOCK_SIZE;
    use crate::error::ErrorKind;

    /// Deterministic random source for reproducible keys and IVs.
    struct SeededRandom(Mutex<StdRng>);

    impl SeededRandom {
        fn new(seed: u64) -> Self {
            Self(Mutex::new(StdRng::seed_from_u64(seed)))
        }
    }

    impl SecureRandom for SeededRandom {
        fn fill(&self, dest: &mut [u8]) -> io::Result<()> {
            self.0.lock().unwrap().fill_bytes(dest);
            Ok(())
        }
    }

    /// A random source that always fails.
    struct BrokenRandom;

    impl SecureRandom for BrokenRandom {
        fn fill(&self, _dest: &mut [u8]) -> io::Result<()> {
            Err(io::Error::other("entropy unavailable"))
        }
    }

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i.wrapping_mul(31) ^ (i >> 7)) as u8).collect()
    }

    fn chunk(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn roundtrip(pipeline: &Pipeline<impl SecureRandom>, dir: &TempDir, plaintext: &[u8]) -> Vec<u8> {
        let src = dir.path().join("plain.bin");
        let enc = dir.path().join("plain.bin.enc");
        let dec = dir.path().join("plain.out");
        fs::write(&src, plaintext).unwrap();

        let key = pipeline.encrypt(&src, &enc, None).unwrap();
        let encoded = encode_key(&key);
        pipeline.decrypt(&enc, &dec, decode_key(&encoded).unwrap(), None).unwrap();

        fs::read(&dec).unwrap()
    }

    #[test]
    fn test_roundtrip_sizes() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new().with_chunk_size(chunk(4096));

        for len in [0, 1, BLOCK_SIZE - 1, BLOCK_SIZE, BLOCK_SIZE + 1, 3 * BLOCK_SIZE, 4096, 4097, 3 * 1024 * 1024 + 5] {
            let plaintext = sample(len);
            assert_eq!(roundtrip(&pipeline, &dir, &plaintext), plaintext, "length {len}");
        }
    }

    #[test]
    fn test_roundtrip_every_key_size() {
        let dir = tempdir().unwrap();
        for &size in KeySize::ALL {
            let pipeline = Pipeline::new().with_key_size(size);
            let plaintext = sample(1000);
            assert_eq!(roundtrip(&pipeline, &dir, &plaintext), plaintext);
        }
    }

    #[test]
    fn test_file_layout() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("plain.bin");
        let enc = dir.path().join("plain.enc");
        fs::write(&src, sample(40)).unwrap();

        let pipeline = Pipeline::with_random(SeededRandom::new(7));
        pipeline.encrypt(&src, &enc, None).unwrap();

        // The IV is drawn right after the 32-byte key.
        let expected = SeededRandom::new(7);
        let mut skipped_key = [0u8; 32];
        let mut iv = [0u8; IV_SIZE];
        expected.fill(&mut skipped_key).unwrap();
        expected.fill(&mut iv).unwrap();

        let encrypted = fs::read(&enc).unwrap();
        assert_eq!(&encrypted[..IV_SIZE], &iv);
        assert_eq!(encrypted.len(), IV_SIZE + 48);
    }

    #[test]
    fn test_fresh_iv_and_key_per_encryption() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("plain.bin");
        let first = dir.path().join("first.enc");
        let second = dir.path().join("second.enc");
        fs::write(&src, sample(100)).unwrap();

        let pipeline = Pipeline::new();
        let first_key = pipeline.encrypt(&src, &first, None).unwrap();
        let second_key = pipeline.encrypt(&src, &second, None).unwrap();

        assert_ne!(first_key, second_key);
        let (a, b) = (fs::read(&first).unwrap(), fs::read(&second).unwrap());
        assert_ne!(a, b);
        assert_ne!(&a[..IV_SIZE], &b[..IV_SIZE]);
    }

    #[test]
    fn test_chunk_size_invariance() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("plain.bin");
        let small = dir.path().join("small.enc");
        let large = dir.path().join("large.enc");
        fs::write(&src, sample(3 * 1024 * 1024 + 123)).unwrap();

        let small_pipeline = Pipeline::with_random(SeededRandom::new(42)).with_chunk_size(chunk(1024));
        let large_pipeline = Pipeline::with_random(SeededRandom::new(42)).with_chunk_size(chunk(1024 * 1024));

        let small_key = small_pipeline.encrypt(&src, &small, None).unwrap();
        let large_key = large_pipeline.encrypt(&src, &large, None).unwrap();
        assert_eq!(small_key, large_key);
        assert_eq!(fs::read(&small).unwrap(), fs::read(&large).unwrap());

        let small_out = dir.path().join("small.out");
        let large_out = dir.path().join("large.out");
        small_pipeline.decrypt(&small, &small_out, small_key, None).unwrap();
        large_pipeline.decrypt(&large, &large_out, large_key, None).unwrap();
        assert_eq!(fs::read(&small_out).unwrap(), fs::read(&large_out).unwrap());
        assert_eq!(fs::read(&small_out).unwrap(), fs::read(&src).unwrap());
    }

    #[test]
    fn test_large_file_streams_in_chunks() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new().with_chunk_size(chunk(4096));
        let plaintext = sample(50 * pipeline.chunk_size() + 7);
        assert_eq!(roundtrip(&pipeline, &dir, &plaintext), plaintext);
    }

    #[test]
    fn test_truncated_input_is_corrupt() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("plain.bin");
        let enc = dir.path().join("plain.enc");
        let dec = dir.path().join("plain.out");
        fs::write(&src, sample(64)).unwrap();

        let pipeline = Pipeline::new();
        let key = pipeline.encrypt(&src, &enc, None).unwrap();
        let encoded = encode_key(&key);

        for len in [0, 1, IV_SIZE - 1] {
            let encrypted = fs::read(&enc).unwrap();
            let truncated = dir.path().join("truncated.enc");
            fs::write(&truncated, &encrypted[..len]).unwrap();

            let err = pipeline.decrypt(&truncated, &dec, decode_key(&encoded).unwrap(), None).unwrap_err();
            assert!(matches!(err, Error::CorruptInput { expected: IV_SIZE, actual, .. } if actual == len));
            assert!(!dec.exists());
        }
    }

    #[test]
    fn test_iv_only_file_fails_decryption() {
        let dir = tempdir().unwrap();
        let enc = dir.path().join("iv-only.enc");
        let dec = dir.path().join("out");
        fs::write(&enc, [9u8; IV_SIZE]).unwrap();

        let key = SymmetricKey::from_bytes(&[1u8; 32]).unwrap();
        let err = Pipeline::new().decrypt(&enc, &dec, key, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
        assert!(!dec.exists());
    }

    #[test]
    fn test_wrong_key_fails_decryption() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("plain.bin");
        let enc = dir.path().join("plain.enc");
        let dec = dir.path().join("plain.out");
        let plaintext = sample(1000);
        fs::write(&src, &plaintext).unwrap();

        let pipeline = Pipeline::new();
        pipeline.encrypt(&src, &enc, None).unwrap();

        // CBC padding is the only check, so a wrong key passes it with
        // probability ~1/256; across several keys at least one must fail and
        // none may reproduce the plaintext.
        let mut rejected = 0;
        for seed in 0..4u8 {
            let wrong = SymmetricKey::from_bytes(&[seed.wrapping_mul(37).wrapping_add(1); 32]).unwrap();
            match pipeline.decrypt(&enc, &dec, wrong, None) {
                Err(err) => {
                    assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
                    assert!(!dec.exists());
                    rejected += 1;
                }
                Ok(()) => {
                    assert_ne!(fs::read(&dec).unwrap(), plaintext);
                    fs::remove_file(&dec).unwrap();
                }
            }
        }

        assert!(rejected > 0);
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nonexistent");
        let out = dir.path().join("out");

        let err = Pipeline::new().encrypt(&missing, &out, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoError);
        assert!(err.to_string().contains("nonexistent"));
        assert!(!out.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        let key = SymmetricKey::from_bytes(&[3u8; 16]).unwrap();
        let err = Pipeline::new().decrypt(&missing, &out, key, None).unwrap_err();
        assert!(matches!(err, Error::Io { ref path, .. } if path == &missing));
        assert!(!out.exists());
    }

    #[test]
    fn test_existing_destination_untouched_on_failure() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::write(&out, b"keep me").unwrap();

        let err = Pipeline::new().encrypt(&dir.path().join("missing"), &out, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoError);
        assert_eq!(fs::read(&out).unwrap(), b"keep me");
    }

    #[test]
    fn test_random_failure_is_encryption_failed() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("plain.bin");
        let out = dir.path().join("out");
        fs::write(&src, b"data").unwrap();

        let err = Pipeline::with_random(BrokenRandom).encrypt(&src, &out, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncryptionFailed);
        assert!(!out.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_read_failure_is_encryption_failed() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("srcdir");
        let out = dir.path().join("nested").join("out.enc");
        fs::create_dir(&src).unwrap();

        let err = Pipeline::new().encrypt(&src, &out, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncryptionFailed);
        assert!(err.to_string().contains("srcdir"));
        assert!(!out.exists());

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("srcdir")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_output_takes_source_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let src = dir.path().join("plain.bin");
        let enc = dir.path().join("plain.bin.enc");
        let dec = dir.path().join("plain.out");
        fs::write(&src, b"permissions").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o644)).unwrap();

        let pipeline = Pipeline::new();
        let key = pipeline.encrypt(&src, &enc, None).unwrap();
        assert_eq!(fs::metadata(&enc).unwrap().permissions().mode() & 0o777, 0o644);

        fs::set_permissions(&enc, fs::Permissions::from_mode(0o600)).unwrap();
        pipeline.decrypt(&enc, &dec, key, None).unwrap();
        assert_eq!(fs::metadata(&dec).unwrap().permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn test_execute_job() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("plain.bin");
        let enc = dir.path().join("plain.enc");
        let dec = dir.path().join("plain.out");
        fs::write(&src, sample(77)).unwrap();

        let pipeline = Pipeline::new();
        let key = SymmetricKey::from_bytes(&[5u8; 24]).unwrap();
        let job = CipherStreamJob::new(Processing::Encryption, &src, &enc, key);
        pipeline.execute(&job, None).unwrap();

        let job = CipherStreamJob::new(Processing::Decryption, &enc, &dec, job.into_key());
        pipeline.execute(&job, None).unwrap();
        assert_eq!(fs::read(&dec).unwrap(), sample(77));
    }
}

use std::io;

use rand::rand_core::{OsRng, TryRngCore};

/// Source of cryptographically secure random bytes for keys and IVs.
///
/// The pipeline takes this as a capability instead of reaching for a global
/// generator, so tests can inject a seeded source and get reproducible output.
pub trait SecureRandom: Send + Sync {
    /// Fills `dest` entirely with random bytes.
    fn fill(&self, dest: &mut [u8]) -> io::Result<()>;
}

/// The operating system's random number generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    #[inline]
    fn fill(&self, dest: &mut [u8]) -> io::Result<()> {
        OsRng.try_fill_bytes(dest).map_err(|e| io::Error::other(format!("secure random source failed: {e}")))
    }
}

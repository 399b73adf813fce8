//! Global configuration constants.
//!
//! These values define the on-disk format and the streaming parameters.
//! Changing [`IV_SIZE`] or [`BLOCK_SIZE`] breaks compatibility with every
//! previously encrypted file; [`CHUNK_SIZE`] is a pure performance knob.

/// Application name used in user interfaces.
pub const APP_NAME: &str = "file-encrypter";

/// Extension appended to encrypted files when no output path is given.
pub const FILE_EXTENSION: &str = ".enc";

/// Extension appended on decryption when the input lacks [`FILE_EXTENSION`].
pub const DECRYPTED_EXTENSION: &str = ".dec";

/// AES block size in bytes.
///
/// Every AES variant uses a 128-bit block, so this holds for all key sizes.
pub const BLOCK_SIZE: usize = 16;

/// Size of the initialization vector stored at the start of each file.
///
/// CBC requires an IV of exactly one block.
pub const IV_SIZE: usize = BLOCK_SIZE;

/// Chunk size for streaming reads.
///
/// Peak memory per operation is roughly two chunks (input plus transformed
/// output). Output bytes never depend on this value.
pub const CHUNK_SIZE: usize = 128 * 1024;

/// Minimum length accepted for key text typed interactively.
///
/// Base64 of the smallest key (16 bytes) is 24 characters.
pub const ENCODED_KEY_MIN_LENGTH: usize = 24;

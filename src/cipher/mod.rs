//! # Cipher Module
//!
//! Key material, randomness and the streaming block cipher.
//!
//! Files are encrypted with AES in CBC mode with PKCS#7 padding. The AES
//! variant (128, 192 or 256 bit) follows from the key length. CBC is not an
//! authenticated mode: a wrong key or corrupted ciphertext is only detected
//! when the final block's padding fails to validate, and tampering that keeps
//! the padding valid goes unnoticed. The format is kept for compatibility with
//! existing encrypted files.
//!
//! [`Cipher`] is fed arbitrary slices and emits only whole blocks, carrying
//! any remainder to the next call, so its output never depends on how the
//! input was split into chunks.

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, InvalidLength, KeyIvInit};
use aes::{Aes128, Aes192, Aes256, Block};
use block_padding::UnpadError;

mod key;
mod random;

pub use key::{KeySize, SymmetricKey, decode_key, encode_key, generate_key};
pub use random::{OsRandom, SecureRandom};

use crate::config::{BLOCK_SIZE, IV_SIZE};
use crate::error::{Error, Result};
use crate::padding;
use crate::types::Processing;

/// CBC state for one key size and direction.
enum Mode {
    Aes128Enc(cbc::Encryptor<Aes128>),
    Aes192Enc(cbc::Encryptor<Aes192>),
    Aes256Enc(cbc::Encryptor<Aes256>),
    Aes128Dec(cbc::Decryptor<Aes128>),
    Aes192Dec(cbc::Decryptor<Aes192>),
    Aes256Dec(cbc::Decryptor<Aes256>),
}

impl Mode {
    fn new(direction: Processing, key: &SymmetricKey, iv: &[u8; IV_SIZE]) -> Result<Self> {
        let key_bytes = key.expose_secret();
        let invalid = |_: InvalidLength| Error::InvalidKeyEncoding(format!("key length {} does not match {:?}", key_bytes.len(), key.size()));

        let mode = match (direction, key.size()) {
            (Processing::Encryption, KeySize::Aes128) => Self::Aes128Enc(cbc::Encryptor::new_from_slices(key_bytes, iv).map_err(invalid)?),
            (Processing::Encryption, KeySize::Aes192) => Self::Aes192Enc(cbc::Encryptor::new_from_slices(key_bytes, iv).map_err(invalid)?),
            (Processing::Encryption, KeySize::Aes256) => Self::Aes256Enc(cbc::Encryptor::new_from_slices(key_bytes, iv).map_err(invalid)?),
            (Processing::Decryption, KeySize::Aes128) => Self::Aes128Dec(cbc::Decryptor::new_from_slices(key_bytes, iv).map_err(invalid)?),
            (Processing::Decryption, KeySize::Aes192) => Self::Aes192Dec(cbc::Decryptor::new_from_slices(key_bytes, iv).map_err(invalid)?),
            (Processing::Decryption, KeySize::Aes256) => Self::Aes256Dec(cbc::Decryptor::new_from_slices(key_bytes, iv).map_err(invalid)?),
        };

        Ok(mode)
    }

    /// Transforms one block in place.
    #[inline]
    fn apply(&mut self, block: &mut Block) {
        match self {
            Self::Aes128Enc(c) => c.encrypt_block_mut(block),
            Self::Aes192Enc(c) => c.encrypt_block_mut(block),
            Self::Aes256Enc(c) => c.encrypt_block_mut(block),
            Self::Aes128Dec(c) => c.decrypt_block_mut(block),
            Self::Aes192Dec(c) => c.decrypt_block_mut(block),
            Self::Aes256Dec(c) => c.decrypt_block_mut(block),
        }
    }
}

/// Streaming AES-CBC transform.
pub struct Cipher {
    mode: Mode,
    direction: Processing,
    /// Bytes not yet transformed: a partial block, or on decryption the
    /// held-back final block.
    pending: Vec<u8>,
}

impl Cipher {
    /// Initializes the cipher for `direction` with `key` and `iv`.
    pub fn new(direction: Processing, key: &SymmetricKey, iv: &[u8; IV_SIZE]) -> Result<Self> {
        let mode = Mode::new(direction, key, iv)?;
        Ok(Self { mode, direction, pending: Vec::with_capacity(BLOCK_SIZE) })
    }

    /// Transforms every complete block available after appending `input`.
    ///
    /// `output` is cleared and receives the transformed bytes. On decryption
    /// the last complete block is held back until [`finalize`](Self::finalize)
    /// because it carries the padding.
    pub fn update(&mut self, input: &[u8], output: &mut Vec<u8>) {
        output.clear();
        output.reserve(self.pending.len() + input.len());
        output.extend_from_slice(&self.pending);
        output.extend_from_slice(input);

        let remainder = output.len() % BLOCK_SIZE;
        let keep = match self.direction {
            Processing::Encryption => remainder,
            Processing::Decryption if remainder == 0 => output.len().min(BLOCK_SIZE),
            Processing::Decryption => remainder,
        };

        let split = output.len() - keep;
        self.pending.clear();
        self.pending.extend_from_slice(&output[split..]);
        output.truncate(split);

        for chunk in output.chunks_exact_mut(BLOCK_SIZE) {
            self.mode.apply(Block::from_mut_slice(chunk));
        }
    }

    /// Processes the final block, appending the result to `output`.
    ///
    /// Encryption pads the remaining bytes and cannot fail. Decryption fails
    /// when the ciphertext was empty, not block aligned, or the padding does
    /// not validate.
    pub fn finalize(mut self, output: &mut Vec<u8>) -> Result<(), UnpadError> {
        match self.direction {
            Processing::Encryption => {
                let mut block = padding::pad(&self.pending);
                self.mode.apply(&mut block);
                output.extend_from_slice(&block);
            }
            Processing::Decryption => {
                if self.pending.len() != BLOCK_SIZE {
                    return Err(UnpadError);
                }

                let mut block = Block::clone_from_slice(&self.pending);
                self.mode.apply(&mut block);
                output.extend_from_slice(padding::unpad(&block)?);
            }
        }

        Ok(())
    }
}

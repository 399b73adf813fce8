//! Symmetric key generation and portable encoding.
//!
//! Keys travel across the process boundary as standard base64 text. Decoding
//! tolerates the line breaks MIME-style encoders insert, so keys produced by
//! other platforms' default base64 encoders are accepted as-is.

use std::fmt::{Debug, Formatter};

use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{Engine, alphabet};
use secrecy::zeroize::Zeroizing;
use secrecy::{ExposeSecret, ExposeSecretMut, SecretBox};
use subtle::ConstantTimeEq;

use crate::cipher::SecureRandom;
use crate::error::{Error, Result};

/// Standard alphabet, accepting key text with or without trailing `=`.
const LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent));

/// AES key sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeySize {
    Aes128,
    Aes192,
    #[default]
    Aes256,
}

impl KeySize {
    /// All supported key sizes, smallest first.
    pub const ALL: &'static [Self] = &[Self::Aes128, Self::Aes192, Self::Aes256];

    /// Key length in bytes.
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }

    /// Returns the key size for a raw key length, if AES supports it.
    #[inline]
    pub fn from_len(len: usize) -> Option<Self> {
        Self::ALL.iter().copied().find(|size| size.bytes() == len)
    }
}

/// Raw AES key material.
///
/// The bytes are zeroized on drop, never printed by `Debug`, and compared in
/// constant time.
pub struct SymmetricKey {
    size: KeySize,
    bytes: SecretBox<Vec<u8>>,
}

impl SymmetricKey {
    /// Wraps raw key bytes, rejecting lengths AES does not accept.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let size = KeySize::from_len(bytes.len())
            .ok_or_else(|| Error::InvalidKeyEncoding(format!("key must be 16, 24 or 32 bytes, got {}", bytes.len())))?;

        Ok(Self { size, bytes: SecretBox::new(Box::new(bytes.to_vec())) })
    }

    #[inline]
    pub fn size(&self) -> KeySize {
        self.size
    }

    #[inline]
    pub fn expose_secret(&self) -> &[u8] {
        self.bytes.expose_secret()
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && bool::from(self.expose_secret().ct_eq(other.expose_secret()))
    }
}

impl Eq for SymmetricKey {}

impl Debug for SymmetricKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey({:?}, [REDACTED])", self.size)
    }
}

/// Generates a fresh random key of the given size.
pub fn generate_key(random: &impl SecureRandom, size: KeySize) -> std::io::Result<SymmetricKey> {
    let mut bytes = SecretBox::new(Box::new(vec![0u8; size.bytes()]));
    random.fill(bytes.expose_secret_mut())?;

    Ok(SymmetricKey { size, bytes })
}

/// Encodes a key as standard padded base64 without line breaks.
pub fn encode_key(key: &SymmetricKey) -> String {
    STANDARD.encode(key.expose_secret())
}

/// Decodes base64 key text back into a key.
///
/// ASCII whitespace anywhere in the text is ignored, and padding is optional.
pub fn decode_key(encoded: &str) -> Result<SymmetricKey> {
    let compact = Zeroizing::new(encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect::<String>());
    if compact.is_empty() {
        return Err(Error::InvalidKeyEncoding("key is empty".to_owned()));
    }

    let bytes = SecretBox::new(Box::new(LENIENT.decode(compact.as_bytes()).map_err(|e| Error::InvalidKeyEncoding(e.to_string()))?));

    SymmetricKey::from_bytes(bytes.expose_secret())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::OsRandom;

    #[test]
    fn test_generate_key_sizes() {
        for &size in KeySize::ALL {
            let key = generate_key(&OsRandom, size).unwrap();
            assert_eq!(key.size(), size);
            assert_eq!(key.expose_secret().len(), size.bytes());
        }
    }

    #[test]
    fn test_generate_key_is_fresh() {
        let first = generate_key(&OsRandom, KeySize::Aes256).unwrap();
        let second = generate_key(&OsRandom, KeySize::Aes256).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_key_roundtrip() {
        for &size in KeySize::ALL {
            let key = generate_key(&OsRandom, size).unwrap();
            let encoded = encode_key(&key);
            assert_eq!(decode_key(&encoded).unwrap(), key);
        }
    }

    #[test]
    fn test_decode_ignores_line_breaks() {
        let key = SymmetricKey::from_bytes(&[7u8; 32]).unwrap();
        let encoded = encode_key(&key);
        let wrapped = format!("{}\n{}\n", &encoded[..20], &encoded[20..]);
        assert_eq!(decode_key(&wrapped).unwrap(), key);
    }

    #[test]
    fn test_decode_accepts_missing_padding() {
        let key = SymmetricKey::from_bytes(&[9u8; 16]).unwrap();
        let encoded = encode_key(&key);
        assert!(encoded.ends_with("=="));

        assert_eq!(decode_key(encoded.trim_end_matches('=')).unwrap(), key);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let err = decode_key("not base64 at all!").unwrap_err();
        assert!(matches!(err, Error::InvalidKeyEncoding(_)));

        let err = decode_key("").unwrap_err();
        assert!(matches!(err, Error::InvalidKeyEncoding(_)));
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let short = STANDARD.encode([1u8; 15]);
        assert!(matches!(decode_key(&short), Err(Error::InvalidKeyEncoding(_))));

        let long = STANDARD.encode([1u8; 33]);
        assert!(matches!(decode_key(&long), Err(Error::InvalidKeyEncoding(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = SymmetricKey::from_bytes(&[0xAB; 16]).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("171"));
    }
}

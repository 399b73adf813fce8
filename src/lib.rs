//! file-encrypter - streaming AES file encryption.
//!
//! Encrypts a file under a freshly generated AES key and a random IV, writing
//! `[IV: 16 bytes][AES-CBC ciphertext with PKCS#7 padding]`. The key is
//! handed back base64-encoded and is needed again to decrypt. Files of any
//! size are processed in fixed-size chunks, and a destination only appears
//! once an operation has fully succeeded.
//!
//! The format carries no authentication tag. A wrong key or damaged file is
//! usually caught by the padding check, but not always; see [`cipher`].
//!
//! ```no_run
//! # fn main() -> file_encrypter::Result<()> {
//! let key = file_encrypter::encrypt_file("report.pdf", "report.pdf.enc")?;
//! file_encrypter::decrypt_file(&key, "report.pdf.enc", "report.pdf")?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod cipher;
pub mod config;
pub mod error;
pub mod file;
pub mod padding;
pub mod processor;
pub mod stream;
pub mod types;
pub mod ui;

pub use cipher::{KeySize, SymmetricKey, decode_key, encode_key, generate_key};
pub use error::{Error, ErrorKind, Result};
pub use processor::{ErrorReport, Processor, decrypt_file, encrypt_file};
pub use stream::Pipeline;

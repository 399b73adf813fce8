//! PKCS#7 padding of the final cipher block.
//!
//! The streaming cipher only ever pads or unpads the last block of a file, so
//! these helpers work on a single AES block rather than on whole buffers.

use aes::Block;
use block_padding::generic_array::typenum::U16;
use block_padding::{Padding, Pkcs7, UnpadError};

use crate::config::BLOCK_SIZE;

/// Builds the final block from the trailing `tail` bytes.
///
/// `tail` must be shorter than one block. An empty tail yields a full block
/// of padding, as PKCS#7 requires.
pub fn pad(tail: &[u8]) -> Block {
    debug_assert!(tail.len() < BLOCK_SIZE, "tail must be shorter than a block");

    let mut block = Block::default();
    block[..tail.len()].copy_from_slice(tail);
    <Pkcs7 as Padding<U16>>::pad(&mut block, tail.len());
    block
}

/// Validates and strips the padding of a decrypted final block.
pub fn unpad(block: &Block) -> Result<&[u8], UnpadError> {
    <Pkcs7 as Padding<U16>>::unpad(block)
}

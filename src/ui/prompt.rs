//! Interactive prompts.

use std::path::Path;

use anyhow::{Result, anyhow};
use inquire::validator::Validation;
use inquire::{Confirm, Password, PasswordDisplayMode};

use crate::config::ENCODED_KEY_MIN_LENGTH;

/// Prompts for an encoded decryption key.
///
/// Input is masked. The text is only checked for plausible length here; the
/// base64 decoding happens in the key provider.
pub fn prompt_key() -> Result<String> {
    Password::new("Enter decryption key")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_validator(|input: &str| {
            if input.trim().len() < ENCODED_KEY_MIN_LENGTH {
                Ok(Validation::Invalid(format!("key must be at least {ENCODED_KEY_MIN_LENGTH} characters").into()))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()
        .map_err(|e| anyhow!("key input failed: {e}"))
}

/// Asks before an existing output file is replaced. Defaults to no.
pub fn confirm_overwrite(path: &Path) -> Result<bool> {
    let filename = path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    Confirm::new(&format!("Output file {filename} already exists. Overwrite?"))
        .with_default(false)
        .prompt()
        .map_err(|e| anyhow!("confirmation failed: {e}"))
}

//! Terminal output for completed operations.

use std::path::Path;

use bytesize::ByteSize;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::types::ProcessorMode;

/// One row of the result summary.
pub struct Summary<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub input_size: u64,
    pub output_size: u64,
}

/// Builds the summary table shown after an operation.
pub fn summary_table(mode: ProcessorMode, summary: &Summary<'_>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_content_arrangement(ContentArrangement::Dynamic).set_header(vec![
        "Operation",
        "Input",
        "Size",
        "Output",
        "Size",
    ]);

    table.add_row(vec![
        mode.label().to_owned(),
        summary.input.display().to_string(),
        ByteSize::b(summary.input_size).to_string(),
        summary.output.display().to_string(),
        ByteSize::b(summary.output_size).to_string(),
    ]);

    table
}

/// Prints the success line and the summary table.
pub fn show_success(mode: ProcessorMode, summary: &Summary<'_>) {
    let action = match mode {
        ProcessorMode::Encrypt => "encrypted",
        ProcessorMode::Decrypt => "decrypted",
    };

    println!();
    println!("{} {}", style("✓").green(), style(format!("File {action} successfully: {}", summary.output.display())).bold());
    println!("{}", summary_table(mode, summary));
}

/// Prints the encryption key.
///
/// This is the only place a key is ever written out.
pub fn show_key(encoded: &str) {
    println!();
    println!("{} {}", style("!").yellow().bold(), style("Store this key safely, it is required for decryption:").bold());
    println!("  {}", style(encoded).cyan());
}

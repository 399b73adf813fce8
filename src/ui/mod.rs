//! User interface components for terminal interaction.
//!
//! - [`display`]: success messages, the key banner and result tables
//! - [`progress`]: byte progress bar fed by the pipeline
//! - [`prompt`]: masked key input and overwrite confirmation

pub mod display;
pub mod progress;
pub mod prompt;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use file_encrypter::config::APP_NAME;
use file_encrypter::file::File;
use file_encrypter::processor::Processor;
use file_encrypter::types::Processing;
use file_encrypter::ui::display::{self, Summary};
use file_encrypter::ui::prompt;
use tracing::{Level, warn};

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt a file under a newly generated key.
    Encrypt {
        #[arg(short, long)]
        input: PathBuf,

        /// Defaults to the input path with `.enc` appended.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output without asking.
        #[arg(short, long)]
        force: bool,
    },

    /// Decrypt a file with a base64-encoded key.
    Decrypt {
        #[arg(short, long)]
        input: PathBuf,

        /// Defaults to the input path without `.enc`.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Prompted for when omitted.
        #[arg(short, long)]
        key: Option<String>,

        /// Overwrite the output without asking.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Parser)]
#[command(name = APP_NAME, version, about = "Encrypt and decrypt files with AES-CBC, streaming in constant memory.")]
pub struct App {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl App {
    pub fn init() -> Result<Self> {
        let app = Self::parse();

        let level = if app.verbose { Level::DEBUG } else { Level::WARN };
        let subscriber = tracing_subscriber::fmt().with_max_level(level).with_file(true).with_line_number(true).finish();
        tracing::subscriber::set_global_default(subscriber)?;

        Ok(app)
    }

    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Encrypt { input, output, force } => Self::run_mode(input, output, None, force, Processing::Encryption).await,
            Commands::Decrypt { input, output, key, force } => Self::run_mode(input, output, key, force, Processing::Decryption).await,
        }
    }

    async fn run_mode(input_path: PathBuf, output_path: Option<PathBuf>, key: Option<String>, force: bool, processing: Processing) -> Result<()> {
        let mode = processing.mode();

        let mut input = File::new(input_path);
        input.validate()?;

        if processing == Processing::Decryption && !input.is_encrypted() {
            warn!(path = %input.path().display(), "input does not have the encrypted file extension");
        }

        let mut output = File::new(output_path.unwrap_or_else(|| input.output_path(mode)));
        anyhow::ensure!(input.path() != output.path(), "input and output are the same file: {}", input.path().display());

        if output.exists() && !force && !prompt::confirm_overwrite(output.path())? {
            anyhow::bail!("operation canceled");
        }

        let key = match (processing, key) {
            (Processing::Decryption, None) => Some(prompt::prompt_key()?),
            (_, key) => key,
        };

        let encoded = Self::process(processing, &input, &output, key.as_deref()).await?;

        if let Some(encoded) = encoded {
            display::show_key(&encoded);
        }

        let (input_size, output_size) = (input.size()?, output.size()?);
        let summary = Summary { input: input.path(), output: output.path(), input_size, output_size };
        display::show_success(mode, &summary);

        Ok(())
    }

    async fn process(processing: Processing, input: &File, output: &File, key: Option<&str>) -> Result<Option<String>> {
        let processor = Processor::new().with_progress(true);

        let result = match (processing, key) {
            (Processing::Encryption, _) => processor.encrypt(input.path(), output.path()).await.map(Some),
            (Processing::Decryption, Some(key)) => processor.decrypt(key, input.path(), output.path()).await.map(|()| None),
            (Processing::Decryption, None) => anyhow::bail!("a key is required for decryption"),
        };

        result.with_context(|| format!("{} failed: {}", processing.mode(), input.path().display()))
    }
}

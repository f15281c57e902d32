pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vintage",
    author = "Christian Weinmayr",
    version,
    about = "Vintage CLI - Give your photos a vintage record album look with Google Gemini",
    long_about = r#"Vintage CLI - Give your photos a vintage record album look with Google Gemini

Upload a photo and let Gemini color grade it like a vintage record album
cover: faded colors, warm tones, and a slightly grainy, nostalgic feel.
Run without arguments to launch the interactive TUI.

SETUP:
  Set your API key via environment variable or config:
    export GEMINI_API_KEY=your-key-here
    vintage config set api.key your-key-here

EXAMPLES:
  Apply the vintage look:
    vintage edit photo.jpg
    vintage e portrait.png --output ./albums

  Manage configuration:
    vintage config show
    vintage config set api.model gemini-2.5-flash-image

  Launch interactive TUI:
    vintage

OUTPUT FORMATS:
  --format text   Human-readable output (default)
  --format json   Machine-readable JSON
  --format quiet  Minimal output, just the saved file path"#,
    after_help = r#"CONFIGURATION:
  Config file: ~/.config/vintage-cli/config.toml (Linux)
  Logging: set RUST_LOG=debug for request diagnostics

  Known models:
    - gemini-2.5-flash-image-preview (default)
    - gemini-2.5-flash-image
    - gemini-3-pro-image-preview"#
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Give a photo the vintage record album look
    ///
    /// Sends the photo to Gemini with a fixed color grading instruction and
    /// saves the result in the output directory as vintage-<file name>.
    #[command(
        alias = "e",
        after_help = r#"EXAMPLES:
  Basic edit:
    vintage edit photo.jpg

  Custom output directory:
    vintage edit photo.jpg --output ./albums

  Keep the result in memory only (JSON includes the data URL):
    vintage edit photo.jpg --no-download --format json"#
    )]
    Edit(commands::edit::EditArgs),

    /// View or modify configuration
    ///
    /// Manage the API key, model and output settings.
    /// Changes are saved to the config file immediately.
    #[command(
        alias = "c",
        after_help = r#"EXAMPLES:
  Show all settings:
    vintage config show

  Get a specific value:
    vintage config get api.model

  Set values:
    vintage config set api.key YOUR_API_KEY
    vintage config set api.timeout_secs 60
    vintage config set output.directory ~/Pictures/vintage

  Show config file path:
    vintage config path

  Reset to defaults:
    vintage config reset --force

AVAILABLE SETTINGS:
  api.key              - Gemini API key
  api.model            - Model used for edits
  api.base_url         - Gemini API base URL
  api.timeout_secs     - Request timeout in seconds
  output.directory     - Where to save images
  output.auto_download - Save edited images automatically (true/false)
  output.display       - Preview mode after saving (terminal/none)"#
    )]
    Config(commands::config::ConfigArgs),
}

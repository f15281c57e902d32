use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::GeminiClient;
use crate::config::{Config, DisplayMode};
use crate::core::{data_url, Session, VINTAGE_PROMPT};

#[derive(Args)]
pub struct EditArgs {
    /// Path to the photo to edit
    #[arg(required = true)]
    pub image: PathBuf,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output directory for the edited image
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Don't save the edited image
    #[arg(long)]
    pub no_download: bool,

    /// Output format (text, json, quiet)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Machine-readable summary of an edit
#[derive(Serialize)]
struct EditReport<'a> {
    source: String,
    model: &'a str,
    prompt: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_response: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    edited_image: Option<&'a str>,
}

pub async fn run(args: EditArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    if let Some(model) = &args.model {
        config.api.model = model.clone();
    }

    // The client needs the credential up front
    let client = GeminiClient::from_config(&config)?;

    let mut session = Session::new();
    let source = args.image.display().to_string();

    session.select_file(&args.image).await?;
    if let Some(error) = session.error() {
        return fail(&args.format, &client, &source, error);
    }

    // Show progress
    let pb = if args.format == "text" {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.yellow} {msg}")
                .context("Invalid progress template")?,
        );
        pb.set_message("Applying vintage filter...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    session.request_edit(&client).await?;

    let Some(edited) = session.edited_image() else {
        if let Some(pb) = &pb {
            pb.finish_with_message(format!("{} Edit failed", "✗".red()));
        }
        let error = session.error().unwrap_or("An unknown error occurred.");
        return fail(&args.format, &client, &source, error);
    };

    let saved = if !args.no_download && config.output.auto_download {
        let output_dir = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output.directory));
        let path = output_dir.join(session.download_name());
        data_url::save(edited, &path)
            .await
            .with_context(|| format!("Failed to save {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    if let Some(pb) = &pb {
        let message = if saved.is_some() {
            format!("{} Vintage edit saved", "✓".green())
        } else {
            format!("{} Vintage edit complete (not saved)", "✓".green())
        };
        pb.finish_with_message(message);
    }

    match args.format.as_str() {
        "json" => {
            let report = EditReport {
                source,
                model: client.model(),
                prompt: VINTAGE_PROMPT,
                status: "completed",
                error: None,
                text_response: session.text_response(),
                path: saved.as_ref().map(|p| p.display().to_string()),
                edited_image: saved.is_none().then(|| edited.as_str()),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "quiet" => {
            if let Some(path) = &saved {
                println!("{}", path.display());
            }
        }
        _ => {
            println!();
            println!("{}: {}", "Source".cyan().bold(), source);
            println!("{}: {}", "Model".cyan().bold(), client.model());
            println!("{}: {}", "Status".cyan().bold(), "completed".green());
            if let Some(text) = session.text_response() {
                println!("{}: {}", "Notes".cyan().bold(), text);
            }

            if let Some(path) = &saved {
                println!();
                println!("{}:", "Vintage Edit".cyan().bold());
                println!("  {}", path.display());

                if config.output.display == DisplayMode::Terminal {
                    println!();
                    display_image_terminal(path);
                }
            }
        }
    }

    Ok(())
}

fn fail(format: &str, client: &GeminiClient, source: &str, error: &str) -> Result<()> {
    if format == "json" {
        let report = EditReport {
            source: source.to_string(),
            model: client.model(),
            prompt: VINTAGE_PROMPT,
            status: "failed",
            error: Some(error),
            text_response: None,
            path: None,
            edited_image: None,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if format != "quiet" {
        eprintln!("{}: {}", "Error".red().bold(), error);
    }
    anyhow::bail!("{}", error)
}

/// Display an image in the terminal using viuer
fn display_image_terminal(path: &Path) {
    let conf = viuer::Config {
        width: Some(80),
        height: Some(30),
        absolute_offset: false,
        ..Default::default()
    };

    if let Err(e) = viuer::print_from_file(path, &conf) {
        tracing::debug!("Failed to display image in terminal: {}", e);
    }
}

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::config::{Config, KeySource};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show all configuration values and where the API key comes from
    Show,

    /// Print one configuration value
    Get {
        /// Config key (e.g., api.model, output.directory)
        key: String,
    },

    /// Change one configuration value and save it
    Set {
        /// Config key (e.g., api.key, api.timeout_secs)
        key: String,
        /// Value to set
        value: String,
    },

    /// Show the config file path
    Path,

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs, config: &mut Config) -> Result<()> {
    match args.command {
        Some(ConfigCommand::Show) | None => print!("{}", render(config)),
        Some(ConfigCommand::Get { key }) => println!("{}", lookup(&key, config)?),
        Some(ConfigCommand::Set { key, value }) => {
            update(&key, &value, config)?;
            println!("{} Set {} = {}", "✓".green(), key.cyan(), config.get(&key).unwrap_or(value));
        }
        Some(ConfigCommand::Path) => println!("{}", config.config_path.display()),
        Some(ConfigCommand::Reset { force: false }) => eprintln!(
            "{}: This will reset all configuration to defaults. Use --force to confirm.",
            "Warning".yellow().bold()
        ),
        Some(ConfigCommand::Reset { force: true }) => {
            reset(config)?;
            if let KeySource::Env(name) = config.key_source() {
                println!("{}", format!("API key from ${} remains in effect", name).dimmed());
            }
            println!("{} Configuration reset to defaults", "✓".green());
        }
    }
    Ok(())
}

/// Format every setting, grouped by table
fn render(config: &Config) -> String {
    let source = config.key_source();
    let key = match source {
        KeySource::Unset => "(not set)".dimmed().to_string(),
        _ => format!("**** ({})", source),
    };

    let mut out = format!("{}\n{}\n\n", "Configuration".cyan().bold(), "=".repeat(50));
    out += &format!("[{}]\n", "api".yellow());
    out += &format!("  {} = {}\n", "key".bold(), key);
    for name in ["model", "base_url", "timeout_secs"] {
        out += &setting_line(config, "api", name);
    }
    out += &format!("\n[{}]\n", "output".yellow());
    for name in ["directory", "auto_download", "display"] {
        out += &setting_line(config, "output", name);
    }
    out += &format!(
        "\n{}\n",
        format!("Config file: {}", config.config_path.display()).dimmed()
    );
    out
}

fn setting_line(config: &Config, table: &str, name: &str) -> String {
    let value = config
        .get(&format!("{}.{}", table, name))
        .unwrap_or_default();
    format!("  {} = {}\n", name.bold(), value)
}

/// Read one value; unknown keys are an error listing the valid ones
fn lookup(key: &str, config: &Config) -> Result<String> {
    if !Config::keys().contains(&key) {
        anyhow::bail!(
            "Unknown config key '{}'. Available keys: {}",
            key,
            Config::keys().join(", ")
        );
    }
    Ok(config.get(key).unwrap_or_else(|| "(not set)".to_string()))
}

fn update(key: &str, value: &str, config: &mut Config) -> Result<()> {
    config.set(key, value)?;
    config.save()
}

/// Restore defaults on disk, keeping the file location and any env key
fn reset(config: &mut Config) -> Result<()> {
    let fresh = Config {
        config_path: config.config_path.clone(),
        env_key: config.env_key.take(),
        ..Config::default()
    };
    *config = fresh;
    config.save()
}

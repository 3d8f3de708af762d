use clap::{Args, Subcommand};

use super::OutputFormat;
use loanapp::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        let mut value = serde_json::to_value(config)?;
                        if config.remote.api_key.is_some() {
                            value["remote"]["api_key"] = serde_json::json!("********");
                        }
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    }
                    OutputFormat::Text => print_text(config),
                }
                Ok(())
            }
        }
    }
}

fn print_text(config: &Config) {
    println!("Configuration");
    println!("=============\n");

    if let Some(path) = &config.config_file {
        println!("Config file: {}", path.display());
    } else {
        println!(
            "Config file: {} (not found)",
            Config::default_config_path().display()
        );
    }
    println!();

    println!("data_dir: {}", config.data_dir.value.display());
    println!("  source: {}", config.data_dir.source);
    println!();

    println!(
        "user_id: {}",
        config.user_id.value.as_deref().unwrap_or("(from server)")
    );
    println!("  source: {}", config.user_id.source);
    println!();

    let remote = &config.remote;
    println!("remote:");
    println!(
        "  server_url: {}",
        remote.server_url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  api_key: {}",
        if remote.api_key.is_some() {
            "********"
        } else {
            "(not set)"
        }
    );
    println!("  timeout_secs: {}", remote.timeout_secs);
    println!("  auto_sync: {}", remote.auto_sync);
    println!("  poll_interval_secs: {}", remote.poll_interval_secs);
}

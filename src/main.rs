use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{
    ApplyCommand, ConfigCommand, Context, ListCommand, StatusCommand, SyncCommand, WatchCommand,
};
use loanapp::config::Config;

#[derive(Parser)]
#[command(name = "loanapp")]
#[command(version)]
#[command(about = "Apply for loans and track them, online or offline", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply for a loan
    Apply(ApplyCommand),

    /// List your loans
    List(ListCommand),

    /// Send offline loans to the server
    Sync(SyncCommand),

    /// Sync automatically whenever the server becomes reachable
    Watch(WatchCommand),

    /// Show connectivity and offline queue status
    Status(StatusCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    loanapp::logging::init(if cli.verbose {
        "loanapp=info"
    } else {
        "loanapp=warn"
    });

    // Load configuration
    let config = Config::load(cli.config)?;

    let Some(command) = cli.command else {
        println!("Use --help to see available commands");
        return Ok(());
    };

    match command {
        Commands::Apply(cmd) => cmd.run(&Context::open(config)?).await?,
        Commands::List(cmd) => cmd.run(&Context::open(config)?).await?,
        Commands::Sync(cmd) => cmd.run(&Context::open(config)?).await?,
        Commands::Watch(cmd) => cmd.run(&Context::open(config)?).await?,
        Commands::Status(cmd) => cmd.run(&Context::open(config)?).await?,
        Commands::Config(cmd) => cmd.run(&config)?,
    }

    Ok(())
}

//! Loan server admin CLI
//!
//! Reviews loan applications directly in the server's database.
//!
//! # Usage
//!
//! ```bash
//! loanapp-admin list alice
//! loanapp-admin review 3f2c... approved
//! ```
//!
//! # Environment Variables
//!
//! - `LOANAPP_DATABASE_PATH`: SQLite database (default: ~/.local/share/loanapp-server/loans.db)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use loanapp::models::LoanStatus;
use loanapp::server::{init_db, LoanDocumentStore};

#[derive(Parser)]
#[command(name = "loanapp-admin")]
#[command(version)]
#[command(about = "Loan server administration tool")]
struct Cli {
    /// Path to the server database
    #[arg(long, env = "LOANAPP_DATABASE_PATH")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a user's loans
    List {
        /// Owning user id
        user_id: String,
    },
    /// Set the review status of a loan
    Review {
        /// Loan id
        id: String,
        /// New status: pending, approved, rejected or flagged
        status: LoanStatus,
    },
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("loanapp-server")
        .join("loans.db")
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
    let path = cli.database.unwrap_or_else(default_database_path);
    let store = LoanDocumentStore::new(init_db(&path).await?);

    for line in execute(&store, cli.command).await? {
        println!("{}", line);
    }

    Ok(())
}

async fn execute(
    store: &LoanDocumentStore,
    command: Commands,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    match command {
        Commands::List { user_id } => {
            let loans = store.list_for_user(&user_id).await?;
            if loans.is_empty() {
                return Ok(vec![format!("No loans for {}.", user_id)]);
            }
            Ok(loans
                .iter()
                .map(|loan| format!("{}  {}", loan.id.as_deref().unwrap_or_default(), loan))
                .collect())
        }
        Commands::Review { id, status } => {
            if store.set_status(&id, status).await? {
                Ok(vec![format!("Loan {} marked {}.", id, status)])
            } else {
                Err(format!("No loan with id {}", id).into())
            }
        }
    }
}

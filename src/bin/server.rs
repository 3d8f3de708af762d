//! Loan document server
//!
//! Stores loan documents in SQLite and serves them to the loanapp client.
//!
//! # Configuration
//!
//! Environment variables:
//! - `LOANAPP_PORT`: Port to listen on (default: 8080)
//! - `LOANAPP_DATABASE_PATH`: SQLite database (default: ~/.local/share/loanapp-server/loans.db)
//! - `LOANAPP_SERVER_CONFIG`: Path to config file (default: ~/.config/loanapp-server/config.yaml)
//!
//! # Config File Format
//!
//! ```yaml
//! api_keys:
//!   - key: "your-secret-key-here"
//!     user_id: "user1"
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use loanapp::server::{init_db, router, ApiKeyStore, AppState, LoanDocumentStore};

/// Server configuration
#[derive(Debug, Clone)]
struct Config {
    /// Port to listen on
    port: u16,
    /// SQLite database path
    database_path: PathBuf,
    /// Path to config file
    config_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let port = std::env::var("LOANAPP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let database_path = std::env::var("LOANAPP_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("loanapp-server")
                    .join("loans.db")
            });

        let config_path = std::env::var("LOANAPP_SERVER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("loanapp-server")
                    .join("config.yaml")
            });

        Self {
            port,
            database_path,
            config_path,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    loanapp::logging::init("loanapp=info,loanapp_server=info,tower_http=info");

    let config = Config::from_env();
    tracing::info!("Database: {}", config.database_path.display());
    tracing::info!("Config file: {}", config.config_path.display());

    let pool = init_db(&config.database_path).await?;
    let api_keys = Arc::new(ApiKeyStore::load(&config.config_path));

    let app = router(AppState {
        store: LoanDocumentStore::new(pool),
        api_keys,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

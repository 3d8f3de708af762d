use clap::Args;

use super::{Context, OutputFormat};
use loanapp::connectivity::Connectivity;
use loanapp::feed::{load_feed, FeedSource, LoanFeed};

/// List your loans
#[derive(Args)]
pub struct ListCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ListCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let connectivity = ctx.connectivity().await;

        let feed = match connectivity {
            Connectivity::Offline => LoanFeed::offline(ctx.cache.get_cached_loans().await?),
            Connectivity::Online => {
                let session = ctx.session().await?;
                // A fresh run has no earlier state; with auto_sync it is
                // treated as a reconnect so pending loans drain first.
                let previous = if ctx.config.remote.auto_sync {
                    Connectivity::Offline
                } else {
                    Connectivity::Online
                };
                load_feed(&ctx.cache, &session, previous, connectivity, ctx.remote()?).await?
            }
        };

        match self.format {
            OutputFormat::Json => {
                let loans: Vec<_> = feed.entries.iter().map(|e| &e.loan).collect();
                println!("{}", serde_json::to_string_pretty(&loans)?);
            }
            OutputFormat::Text => print_feed(&feed),
        }

        Ok(())
    }
}

fn print_feed(feed: &LoanFeed) {
    if feed.source == FeedSource::Cache {
        println!("You are offline. Some features may be unavailable.");
        println!();
    }

    if feed.is_empty() {
        println!("No loans yet. Apply with `loanapp apply`.");
        return;
    }

    for entry in &feed.entries {
        println!("{}", entry);
    }
}

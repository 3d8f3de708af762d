//! Sync CLI command for draining offline loans into the remote store.

use clap::Args;

use super::Context;
use loanapp::connectivity::Connectivity;

/// Send offline loans to the server
#[derive(Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let connectivity = ctx.connectivity().await;

        if connectivity == Connectivity::Offline {
            let waiting = ctx
                .cache
                .get_cached_loans()
                .await?
                .iter()
                .filter(|l| l.offline)
                .count();
            println!(
                "Server unreachable. {} loan{} waiting to sync.",
                waiting,
                if waiting == 1 { "" } else { "s" }
            );
            return Ok(());
        }

        let session = ctx.session().await?;
        println!("Syncing with server...");

        let report = ctx
            .cache
            .sync_loans(&session, connectivity, ctx.remote()?)
            .await?;

        if report.pending == 0 {
            println!("Already up to date.");
        } else {
            println!(
                "  ✓ {} of {} offline loan{} synced",
                report.synced,
                report.pending,
                if report.pending == 1 { "" } else { "s" }
            );
            println!("Sync complete.");
        }

        Ok(())
    }
}

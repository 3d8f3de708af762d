use std::sync::Arc;

use clap::Args;

use super::Context;
use loanapp::auto_sync::AutoSync;
use loanapp::connectivity::ConnectivityMonitor;
use loanapp::remote::RemoteLoanStore;

/// Watch connectivity and sync offline loans whenever the server comes back
#[derive(Args)]
pub struct WatchCommand {
    /// Seconds between health checks (overrides remote.poll_interval_secs)
    #[arg(long)]
    interval: Option<u64>,
}

impl WatchCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let remote = ctx.remote()?.clone();
        let server_url = remote.server_url().to_string();
        let session = ctx.session().await?;

        let interval = match self.interval {
            Some(secs) => std::time::Duration::from_secs(secs.max(1)),
            None => ctx.config.remote.poll_interval(),
        };

        let initial = ctx.connectivity().await;
        println!(
            "Watching {} every {}s (currently {}). Press Ctrl-C to stop.",
            server_url,
            interval.as_secs(),
            initial
        );

        let monitor = ConnectivityMonitor::new(server_url, interval, ctx.config.remote.timeout());
        let (states, poller) = monitor.spawn(initial);

        let remote: Arc<dyn RemoteLoanStore> = Arc::new(remote);
        let auto_sync = AutoSync::new(ctx.cache.clone(), session, remote);

        tokio::select! {
            passes = auto_sync.run(states) => {
                tracing::debug!(passes, "connectivity monitor stopped");
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                println!("Stopped.");
            }
        }
        poller.abort();

        Ok(())
    }
}

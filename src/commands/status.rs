use clap::Args;

use super::Context;

/// Show connectivity and offline queue status
#[derive(Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let connectivity = ctx.connectivity().await;
        let cached = ctx.cache.get_cached_loans().await?;
        let waiting = cached.iter().filter(|l| l.offline).count();

        match ctx.remote.as_ref() {
            Some(remote) => println!("Server:  {} ({})", remote.server_url(), connectivity),
            None => println!("Server:  not configured"),
        }
        println!("Cache:   {}", ctx.config.data_dir.value.display());
        println!("Cached:  {} loan(s)", cached.len());
        println!("Waiting: {} offline loan(s)", waiting);

        Ok(())
    }
}

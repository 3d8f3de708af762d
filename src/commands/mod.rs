mod apply;
mod config_cmd;
mod context;
mod list;
mod status;
mod sync_cmd;
mod watch;

pub use apply::ApplyCommand;
pub use config_cmd::ConfigCommand;
pub use context::Context;
pub use list::ListCommand;
pub use status::StatusCommand;
pub use sync_cmd::SyncCommand;
pub use watch::WatchCommand;

use clap::ValueEnum;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

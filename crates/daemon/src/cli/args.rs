pub use clap::Parser;

use url::Url;

#[derive(Parser, Debug)]
#[command(name = "nestnote")]
#[command(about = "Family notes daemon and CLI")]
pub struct Args {
    /// Base URL of a running daemon
    #[arg(long, global = true, default_value = "http://localhost:8000")]
    pub remote: Url,

    /// Bearer token for authenticated operations
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}

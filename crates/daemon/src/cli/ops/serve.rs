use std::path::PathBuf;

use clap::Args;

use nestnote_daemon::{spawn_service, ServiceConfig};

const TOKEN_SECRET_ENV: &str = "NESTNOTE_TOKEN_SECRET";

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Port for the API server
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Path to the sqlite database file (in-memory when not set)
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Secret used to sign bearer tokens (falls back to NESTNOTE_TOKEN_SECRET)
    #[arg(long)]
    pub token_secret: Option<String>,

    /// Bearer token lifetime in seconds
    #[arg(long, default_value_t = 86400)]
    pub token_ttl_secs: u64,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("no token secret provided; pass --token-secret or set {TOKEN_SECRET_ENV}")]
    MissingSecret,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let token_secret = match &self.token_secret {
            Some(secret) => secret.clone(),
            None => std::env::var(TOKEN_SECRET_ENV).map_err(|_| ServeError::MissingSecret)?,
        };

        let config = ServiceConfig {
            api_port: self.port,
            sqlite_path: self.db_path.clone(),
            token_secret,
            token_ttl_secs: self.token_ttl_secs,
            log_level: tracing::Level::DEBUG,
            log_dir: self.log_dir.clone(),
        };

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}

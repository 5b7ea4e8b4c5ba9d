use url::Url;

use common::prelude::LinkingEngine;

use crate::auth::TokenIssuer;
use crate::database::{Database, DatabaseSetupError};
use crate::ServiceConfig;

/// Shared handle cloned into every request handler.
#[derive(Clone)]
pub struct State {
    database: Database,
    linking: LinkingEngine<Database, Database>,
    tokens: TokenIssuer,
}

impl State {
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        let database_url = match &config.sqlite_path {
            Some(path) => Url::parse(&format!("sqlite://{}", path.display()))?,
            None => Url::parse("sqlite::memory:")?,
        };
        let database = Database::connect(&database_url).await?;

        Ok(Self::new(database, &config.token_secret, config.token_ttl_secs))
    }

    pub fn new(database: Database, token_secret: &str, token_ttl_secs: u64) -> Self {
        let linking = LinkingEngine::new(database.clone(), database.clone());
        let tokens = TokenIssuer::new(token_secret, token_ttl_secs);

        Self {
            database,
            linking,
            tokens,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn linking(&self) -> &LinkingEngine<Database, Database> {
        &self.linking
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("invalid database url: {0}")]
    DatabaseUrl(#[from] url::ParseError),

    #[error("database setup failed: {0}")]
    DatabaseSetup(#[from] DatabaseSetupError),
}

use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::Identity;

use crate::auth::password::{self, PasswordError};
use crate::auth::TokenError;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct SigninRequest {
    /// Email address
    #[arg(long)]
    pub email: String,
    /// Password
    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigninResponse {
    pub access_token: String,
    pub token_type: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<SigninRequest>,
) -> Result<impl IntoResponse, SigninError> {
    // An unknown email and a wrong password produce the same rejection.
    let account = state
        .database()
        .account_by_email(&req.email)
        .await?
        .ok_or(SigninError::BadCredentials)?;

    if !password::verify_password(&req.password, &account.password_hash)? {
        return Err(SigninError::BadCredentials);
    }

    let identity = Identity::new(account.id, account.role);
    let access_token = state.tokens().issue(&identity)?;

    tracing::info!(account_id = %account.id, "account signed in");

    Ok(Json(SigninResponse {
        access_token,
        token_type: "bearer".to_string(),
    })
    .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum SigninError {
    #[error("invalid email or password")]
    BadCredentials,
    #[error("{0}")]
    Password(#[from] PasswordError),
    #[error("{0}")]
    Token(#[from] TokenError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for SigninError {
    fn into_response(self) -> Response {
        match self {
            SigninError::BadCredentials => (
                http::StatusCode::UNAUTHORIZED,
                "invalid email or password".to_string(),
            )
                .into_response(),
            SigninError::Database(e) => database_error_response("SIGNIN", &e),
            e => {
                tracing::error!("SIGNIN ERROR: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
                    .into_response()
            }
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for SigninRequest {
    type Response = SigninResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/auth/signin").unwrap();
        client.post(full_url).json(&self)
    }
}

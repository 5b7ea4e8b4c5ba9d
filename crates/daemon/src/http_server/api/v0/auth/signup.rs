use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::{compose_profile, Profile, Role};

use crate::auth::password::{self, PasswordError};
use crate::database::NewAccount;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::ServiceState;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct SignupRequest {
    /// Email address to register
    #[arg(long)]
    pub email: String,
    /// Display name
    #[arg(long)]
    pub name: String,
    /// Account role, parent or child; immutable after signup
    #[arg(long)]
    pub role: Role,
    /// Password, at least 8 characters
    #[arg(long)]
    pub password: String,
}

pub type SignupResponse = Profile;

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, SignupError> {
    if !req.email.contains('@') {
        return Err(SignupError::Validation("email is not valid".into()));
    }
    if req.name.trim().is_empty() {
        return Err(SignupError::Validation("name cannot be empty".into()));
    }
    if req.password.len() < MIN_PASSWORD_LENGTH {
        return Err(SignupError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let password_hash = password::hash_password(&req.password)?;

    let account = state
        .database()
        .create_account(NewAccount {
            email: req.email,
            name: req.name,
            role: req.role,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                SignupError::EmailTaken
            }
            e => SignupError::Database(e),
        })?;

    tracing::info!(account_id = %account.id, role = %account.role, "account registered");

    let profile = compose_profile(
        account.id,
        account.name,
        account.email,
        account.role,
        account.created_at,
        None,
        Vec::new(),
    );

    Ok((http::StatusCode::CREATED, Json(profile)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("invalid signup: {0}")]
    Validation(String),
    #[error("email address is already registered")]
    EmailTaken,
    #[error("{0}")]
    Password(#[from] PasswordError),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl IntoResponse for SignupError {
    fn into_response(self) -> Response {
        match self {
            SignupError::Validation(msg) => {
                (http::StatusCode::BAD_REQUEST, msg).into_response()
            }
            SignupError::EmailTaken => (
                http::StatusCode::CONFLICT,
                "email address is already registered".to_string(),
            )
                .into_response(),
            SignupError::Password(e) => {
                tracing::error!("SIGNUP ERROR: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
                    .into_response()
            }
            SignupError::Database(e) => database_error_response("SIGNUP", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for SignupRequest {
    type Response = SignupResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/auth/signup").unwrap();
        client.post(full_url).json(&self)
    }
}

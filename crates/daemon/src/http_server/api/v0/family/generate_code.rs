use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use url::Url;

use crate::auth::Requester;
use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

use super::{link_error_response, FamilyLinkError};

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct CodeRequest {
    /// Days until the code lapses; omit for a code that never expires
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeResponse {
    pub code: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

/// Issue a fresh invitation code for the calling parent, superseding
/// any previous one. Existing links are untouched.
pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
    Json(req): Json<CodeRequest>,
) -> Result<impl IntoResponse, CodeError> {
    if let Some(days) = req.ttl_days {
        if days <= 0 {
            return Err(CodeError::InvalidTtl);
        }
    }

    let ttl = req.ttl_days.map(Duration::days);
    let record = state.linking().generate_code(&caller, ttl).await?;

    Ok((
        http::StatusCode::CREATED,
        Json(CodeResponse {
            code: record.code.to_string(),
            expires_at: record.expires_at,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    #[error("ttl_days must be positive")]
    InvalidTtl,
    #[error("{0}")]
    Link(#[from] FamilyLinkError),
}

impl IntoResponse for CodeError {
    fn into_response(self) -> Response {
        match self {
            CodeError::InvalidTtl => (
                http::StatusCode::BAD_REQUEST,
                "ttl_days must be positive".to_string(),
            )
                .into_response(),
            CodeError::Link(e) => link_error_response(e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for CodeRequest {
    type Response = CodeResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/family/code").unwrap();
        client.post(full_url).json(&self)
    }
}

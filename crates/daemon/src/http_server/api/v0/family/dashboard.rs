use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use common::invite::{InviteStore, InviteStoreError};
use common::prelude::LinkedAccount;

use crate::auth::Requester;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DashboardRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    /// Currently redeemable code, if one exists.
    pub code: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    pub children: Vec<LinkedAccount>,
}

/// Parent overview: the live invitation code and all linked children.
pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
) -> Result<impl IntoResponse, DashboardError> {
    if !caller.is_parent() {
        return Err(DashboardError::ParentsOnly);
    }

    let current = state.database().current_for(caller.id).await?;
    let children = state.database().linked_children(caller.id).await?;

    let (code, expires_at) = match current {
        Some(record) => (Some(record.code.to_string()), record.expires_at),
        None => (None, None),
    };

    Ok(Json(DashboardResponse {
        code,
        expires_at,
        children,
    })
    .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("operation requires the parent role")]
    ParentsOnly,
    #[error("{0}")]
    Invites(#[from] InviteStoreError<sqlx::Error>),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        match self {
            DashboardError::ParentsOnly => (
                http::StatusCode::FORBIDDEN,
                "operation requires the parent role".to_string(),
            )
                .into_response(),
            DashboardError::Invites(InviteStoreError::Provider(e)) => {
                database_error_response("DASHBOARD", &e)
            }
            // reads never collide; this arm is unreachable in practice
            DashboardError::Invites(e) => {
                tracing::error!("DASHBOARD ERROR: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
                    .into_response()
            }
            DashboardError::Database(e) => database_error_response("DASHBOARD", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for DashboardRequest {
    type Response = DashboardResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/family/dashboard").unwrap();
        client.get(full_url)
    }
}

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::Requester;
use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

use super::{link_error_response, FamilyLinkError};

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct LeaveRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveResponse {
    pub status: String,
}

/// Sever the caller's family link(s). Idempotent for both roles: a
/// child drops its edge, a parent drops every edge it supervises.
pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
) -> Result<impl IntoResponse, LeaveError> {
    state.linking().leave(&caller).await?;

    Ok(Json(LeaveResponse {
        status: "ok".to_string(),
    })
    .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum LeaveError {
    #[error("{0}")]
    Link(#[from] FamilyLinkError),
}

impl IntoResponse for LeaveError {
    fn into_response(self) -> Response {
        match self {
            LeaveError::Link(e) => link_error_response(e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for LeaveRequest {
    type Response = LeaveResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/family/leave").unwrap();
        client.post(full_url).json(&self)
    }
}

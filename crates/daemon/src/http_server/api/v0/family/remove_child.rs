use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::auth::Requester;
use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

use super::{link_error_response, FamilyLinkError};

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct RemoveChildRequest {
    /// Id of the child to unlink
    #[arg(long)]
    pub child_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveChildResponse {
    pub status: String,
}

/// Parent-only removal of one linked child.
pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
    Path(child_id): Path<Uuid>,
) -> Result<impl IntoResponse, RemoveChildError> {
    state.linking().remove_child(&caller, child_id).await?;

    Ok(Json(RemoveChildResponse {
        status: "ok".to_string(),
    })
    .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveChildError {
    #[error("{0}")]
    Link(#[from] FamilyLinkError),
}

impl IntoResponse for RemoveChildError {
    fn into_response(self) -> Response {
        match self {
            RemoveChildError::Link(e) => link_error_response(e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for RemoveChildRequest {
    type Response = RemoveChildResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/family/children/{}", self.child_id))
            .unwrap();
        client.delete(full_url)
    }
}

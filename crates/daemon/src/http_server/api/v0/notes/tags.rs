use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::scope_for;

use crate::auth::Requester;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct TagsRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

/// Distinct tags across the caller's read scope, sorted.
pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
) -> Result<impl IntoResponse, TagsError> {
    let db = state.database();
    let view = db.family_view(&caller).await?;
    let owners = scope_for(&caller, &view);

    let tags = db.tags_for_owners(&owners).await?;

    Ok(Json(TagsResponse { tags }).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum TagsError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for TagsError {
    fn into_response(self) -> Response {
        match self {
            TagsError::Database(e) => database_error_response("TAGS", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for TagsRequest {
    type Response = TagsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/notes/tags").unwrap();
        client.get(full_url)
    }
}

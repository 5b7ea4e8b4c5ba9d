use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::scope_for;

use crate::auth::Requester;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::ServiceState;

use super::Folder;

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct ListRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub folders: Vec<Folder>,
}

/// List folders across the caller's read scope.
pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
    Json(_req): Json<ListRequest>,
) -> Result<impl IntoResponse, ListError> {
    let db = state.database();
    let view = db.family_view(&caller).await?;
    let owners = scope_for(&caller, &view);

    let records = db.folders_for_owners(&owners).await?;
    let folders = records.into_iter().map(Folder::from).collect();

    Ok(Json(ListResponse { folders }).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        match self {
            ListError::Database(e) => database_error_response("LIST FOLDERS", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for ListRequest {
    type Response = ListResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/folders/list").unwrap();
        client.post(full_url).json(&self)
    }
}

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use common::prelude::Operation;

use crate::auth::Requester;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::http_server::api::v0::access::{gate, AccessDenied};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteRequest {
    /// Folder id
    #[arg(long)]
    pub folder_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Delete a folder; contained notes and subfolders are detached, not
/// deleted with it.
pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
    Path(folder_id): Path<Uuid>,
) -> Result<impl IntoResponse, DeleteError> {
    let db = state.database();

    let record = db
        .folder_by_id(folder_id)
        .await?
        .ok_or(AccessDenied::Hidden)?;

    let view = db.family_view(&caller).await?;
    gate(&caller, &view, record.owner_id, Operation::Write)?;

    let deleted = db.delete_folder(folder_id).await?;
    tracing::info!(folder_id = %folder_id, owner_id = %record.owner_id, "folder deleted");

    Ok(Json(DeleteResponse { deleted }).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("{0}")]
    Access(#[from] AccessDenied),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        match self {
            DeleteError::Access(denied) => (denied.status(), denied.to_string()).into_response(),
            DeleteError::Database(e) => database_error_response("DELETE FOLDER", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for DeleteRequest {
    type Response = DeleteResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/folders/{}", self.folder_id))
            .unwrap();
        client.delete(full_url)
    }
}

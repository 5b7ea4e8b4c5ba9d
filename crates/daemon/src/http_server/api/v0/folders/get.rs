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

use super::Folder;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct GetRequest {
    /// Folder id
    #[arg(long)]
    pub folder_id: Uuid,
}

pub type GetResponse = Folder;

pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
    Path(folder_id): Path<Uuid>,
) -> Result<impl IntoResponse, GetError> {
    let db = state.database();

    let record = db
        .folder_by_id(folder_id)
        .await?
        .ok_or(AccessDenied::Hidden)?;

    let view = db.family_view(&caller).await?;
    gate(&caller, &view, record.owner_id, Operation::Read)?;

    Ok(Json(Folder::from(record)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error("{0}")]
    Access(#[from] AccessDenied),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for GetError {
    fn into_response(self) -> Response {
        match self {
            GetError::Access(denied) => (denied.status(), denied.to_string()).into_response(),
            GetError::Database(e) => database_error_response("GET FOLDER", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for GetRequest {
    type Response = GetResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/folders/{}", self.folder_id))
            .unwrap();
        client.get(full_url)
    }
}

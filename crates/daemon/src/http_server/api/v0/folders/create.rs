use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::auth::Requester;
use crate::database::NewFolder;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::ServiceState;

use super::Folder;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct CreateRequest {
    /// Folder name
    #[arg(long)]
    pub name: String,
    /// Parent folder to nest under
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder_id: Option<Uuid>,
}

pub type CreateResponse = Folder;

/// Create a folder owned by the caller.
pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, CreateError> {
    if req.name.trim().is_empty() {
        return Err(CreateError::InvalidName);
    }

    // A foreign parent folder reads as absent.
    if let Some(parent_folder_id) = req.parent_folder_id {
        state
            .database()
            .folder_by_id(parent_folder_id)
            .await?
            .filter(|f| f.owner_id == caller.id)
            .ok_or(CreateError::NoSuchFolder)?;
    }

    let record = state
        .database()
        .create_folder(NewFolder {
            owner_id: caller.id,
            name: req.name,
            parent_folder_id: req.parent_folder_id,
        })
        .await?;

    tracing::info!(folder_id = %record.id, owner_id = %caller.id, "folder created");

    Ok((http::StatusCode::CREATED, Json(Folder::from(record))).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("name cannot be empty")]
    InvalidName,
    #[error("no such folder")]
    NoSuchFolder,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        match self {
            CreateError::InvalidName => (
                http::StatusCode::BAD_REQUEST,
                "name cannot be empty".to_string(),
            )
                .into_response(),
            CreateError::NoSuchFolder => {
                (http::StatusCode::NOT_FOUND, "no such folder".to_string()).into_response()
            }
            CreateError::Database(e) => database_error_response("CREATE FOLDER", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for CreateRequest {
    type Response = CreateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/folders").unwrap();
        client.post(full_url).json(&self)
    }
}

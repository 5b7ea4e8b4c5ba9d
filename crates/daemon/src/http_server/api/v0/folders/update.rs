use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use common::prelude::Operation;

use crate::auth::Requester;
use crate::database::UpdateFolder;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::http_server::api::v0::access::{gate, AccessDenied};
use crate::http_server::api::v0::fields::double_option;
use crate::ServiceState;

use super::Folder;

/// Request body for updating a folder (used by handler)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Absent leaves the parent alone; null moves the folder to the
    /// top level.
    #[serde(
        default,
        with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_folder_id: Option<Option<Uuid>>,
}

/// Full request for updating a folder (used by client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub folder_id: Uuid,
    #[serde(flatten)]
    pub body: UpdateBody,
}

pub type UpdateResponse = Folder;

pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
    Path(folder_id): Path<Uuid>,
    Json(req): Json<UpdateBody>,
) -> Result<impl IntoResponse, UpdateError> {
    let db = state.database();

    let record = db
        .folder_by_id(folder_id)
        .await?
        .ok_or(AccessDenied::Hidden)?;

    let view = db.family_view(&caller).await?;
    gate(&caller, &view, record.owner_id, Operation::Write)?;

    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(UpdateError::InvalidName);
        }
    }

    if let Some(Some(parent_folder_id)) = req.parent_folder_id {
        if parent_folder_id == folder_id {
            return Err(UpdateError::SelfParent);
        }
        db.folder_by_id(parent_folder_id)
            .await?
            .filter(|f| f.owner_id == caller.id)
            .ok_or(AccessDenied::Hidden)?;
    }

    let updated = db
        .update_folder(
            record,
            UpdateFolder {
                name: req.name,
                parent_folder_id: req.parent_folder_id,
            },
        )
        .await?;

    Ok(Json(Folder::from(updated)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("name cannot be empty")]
    InvalidName,
    #[error("a folder cannot be its own parent")]
    SelfParent,
    #[error("{0}")]
    Access(#[from] AccessDenied),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        match self {
            UpdateError::InvalidName => (
                http::StatusCode::BAD_REQUEST,
                "name cannot be empty".to_string(),
            )
                .into_response(),
            UpdateError::SelfParent => (
                http::StatusCode::BAD_REQUEST,
                "a folder cannot be its own parent".to_string(),
            )
                .into_response(),
            UpdateError::Access(denied) => (denied.status(), denied.to_string()).into_response(),
            UpdateError::Database(e) => database_error_response("UPDATE FOLDER", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for UpdateRequest {
    type Response = UpdateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/folders/{}", self.folder_id))
            .unwrap();
        client.put(full_url).json(&self.body)
    }
}

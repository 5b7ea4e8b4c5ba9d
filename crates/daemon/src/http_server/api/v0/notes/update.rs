use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use common::prelude::Operation;

use crate::auth::Requester;
use crate::database::UpdateNote;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::http_server::api::v0::access::{gate, AccessDenied};
use crate::http_server::api::v0::fields::double_option;
use crate::ServiceState;

use super::Note;

/// Request body for updating a note (used by handler)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Absent leaves the folder alone; null moves the note out of it.
    #[serde(
        default,
        with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub folder_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Full request for updating a note (used by client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub note_id: Uuid,
    #[serde(flatten)]
    pub body: UpdateBody,
}

pub type UpdateResponse = Note;

pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
    Path(note_id): Path<Uuid>,
    Json(req): Json<UpdateBody>,
) -> Result<impl IntoResponse, UpdateError> {
    let db = state.database();

    let record = db.note_by_id(note_id).await?.ok_or(AccessDenied::Hidden)?;

    let view = db.family_view(&caller).await?;
    gate(&caller, &view, record.owner_id, Operation::Write)?;

    if let Some(title) = &req.title {
        if title.trim().is_empty() {
            return Err(UpdateError::InvalidTitle);
        }
    }

    // Moving into a folder requires the target to be the caller's own.
    if let Some(Some(folder_id)) = req.folder_id {
        db.folder_by_id(folder_id)
            .await?
            .filter(|f| f.owner_id == caller.id)
            .ok_or(AccessDenied::Hidden)?;
    }

    let updated = db
        .update_note(
            record,
            UpdateNote {
                title: req.title,
                content: req.content,
                folder_id: req.folder_id,
                tags: req.tags,
            },
        )
        .await?;

    Ok(Json(Note::from(updated)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("title cannot be empty")]
    InvalidTitle,
    #[error("{0}")]
    Access(#[from] AccessDenied),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        match self {
            UpdateError::InvalidTitle => (
                http::StatusCode::BAD_REQUEST,
                "title cannot be empty".to_string(),
            )
                .into_response(),
            UpdateError::Access(denied) => (denied.status(), denied.to_string()).into_response(),
            UpdateError::Database(e) => database_error_response("UPDATE NOTE", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for UpdateRequest {
    type Response = UpdateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/notes/{}", self.note_id))
            .unwrap();
        client.put(full_url).json(&self.body)
    }
}

use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::auth::Requester;
use crate::database::NewNote;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::ServiceState;

use super::Note;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct CreateRequest {
    /// Note title
    #[arg(long)]
    pub title: String,
    /// Note body
    #[arg(long, default_value = "")]
    #[serde(default)]
    pub content: String,
    /// Folder to file the note under
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Uuid>,
    /// Tags, repeatable
    #[arg(long = "tag")]
    #[serde(default)]
    pub tags: Vec<String>,
}

pub type CreateResponse = Note;

/// Create a note owned by the caller. Writes are always self-scoped;
/// there is no way to create a note in another account.
pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, CreateError> {
    if req.title.trim().is_empty() {
        return Err(CreateError::InvalidTitle);
    }

    // A foreign folder reads as absent, same as resource access.
    if let Some(folder_id) = req.folder_id {
        state
            .database()
            .folder_by_id(folder_id)
            .await?
            .filter(|f| f.owner_id == caller.id)
            .ok_or(CreateError::NoSuchFolder)?;
    }

    let record = state
        .database()
        .create_note(NewNote {
            owner_id: caller.id,
            title: req.title,
            content: req.content,
            folder_id: req.folder_id,
            tags: req.tags,
        })
        .await?;

    tracing::info!(note_id = %record.id, owner_id = %caller.id, "note created");

    Ok((http::StatusCode::CREATED, Json(Note::from(record))).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("title cannot be empty")]
    InvalidTitle,
    #[error("no such folder")]
    NoSuchFolder,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        match self {
            CreateError::InvalidTitle => (
                http::StatusCode::BAD_REQUEST,
                "title cannot be empty".to_string(),
            )
                .into_response(),
            CreateError::NoSuchFolder => {
                (http::StatusCode::NOT_FOUND, "no such folder".to_string()).into_response()
            }
            CreateError::Database(e) => database_error_response("CREATE NOTE", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for CreateRequest {
    type Response = CreateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/notes").unwrap();
        client.post(full_url).json(&self)
    }
}

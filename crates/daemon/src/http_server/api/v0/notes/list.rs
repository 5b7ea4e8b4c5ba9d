use std::collections::HashMap;

use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use common::prelude::{scope_for, Operation};

use crate::auth::Requester;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::http_server::api::v0::access::{gate, AccessDenied};
use crate::ServiceState;

use super::Note;

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct ListRequest {
    /// Only notes in this folder
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Uuid>,
    /// Only notes carrying this tag
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListedNote {
    #[serde(flatten)]
    pub note: Note,
    /// Display name of the owning account.
    pub owner_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub notes: Vec<ListedNote>,
}

/// List notes across the caller's read scope: self for children, self
/// plus linked children for parents. The scope is computed from a
/// fresh relationship snapshot on every call.
pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
    Json(req): Json<ListRequest>,
) -> Result<impl IntoResponse, ListError> {
    let db = state.database();
    let view = db.family_view(&caller).await?;

    // A folder filter narrows the scope to that folder's owner, after
    // the same read gate as fetching the folder itself.
    let owners = match req.folder_id {
        Some(folder_id) => {
            let folder = db
                .folder_by_id(folder_id)
                .await?
                .ok_or(AccessDenied::Hidden)?;
            gate(&caller, &view, folder.owner_id, Operation::Read)?;
            vec![folder.owner_id]
        }
        None => scope_for(&caller, &view),
    };

    let records = db
        .notes_for_owners(&owners, req.folder_id, req.tag.as_deref())
        .await?;

    // Resolve owner ids to display names once for the whole page.
    let mut names: HashMap<Uuid, String> = HashMap::new();
    if let Some(own) = db.account_by_id(caller.id).await? {
        names.insert(own.id, own.name);
    }
    for child in db.linked_children(caller.id).await? {
        names.insert(child.id, child.name);
    }

    let notes = records
        .into_iter()
        .map(|record| {
            let owner_name = names.get(&record.owner_id).cloned().unwrap_or_default();
            ListedNote {
                note: Note::from(record),
                owner_name,
            }
        })
        .collect();

    Ok(Json(ListResponse { notes }).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("{0}")]
    Access(#[from] AccessDenied),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        match self {
            ListError::Access(denied) => {
                (denied.status(), denied.to_string()).into_response()
            }
            ListError::Database(e) => database_error_response("LIST NOTES", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for ListRequest {
    type Response = ListResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/notes/list").unwrap();
        client.post(full_url).json(&self)
    }
}

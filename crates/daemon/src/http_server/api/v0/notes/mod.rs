use axum::Router;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod tags;
pub mod update;

use crate::database::NoteRecord;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    use axum::routing::{get as get_route, post};

    Router::new()
        .route("/", post(create::handler))
        .route("/list", post(list::handler))
        .route("/tags", get_route(tags::handler))
        .route(
            "/:note_id",
            get_route(get::handler)
                .put(update::handler)
                .delete(delete::handler),
        )
        .with_state(state)
}

/// Wire representation of a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub folder_id: Option<Uuid>,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        Note {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            content: record.content,
            folder_id: record.folder_id,
            tags: record.tags,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

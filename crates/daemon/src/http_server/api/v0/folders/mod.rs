use axum::Router;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use crate::database::FolderRecord;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    use axum::routing::{get as get_route, post};

    Router::new()
        .route("/", post(create::handler))
        .route("/list", post(list::handler))
        .route(
            "/:folder_id",
            get_route(get::handler)
                .put(update::handler)
                .delete(delete::handler),
        )
        .with_state(state)
}

/// Wire representation of a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub parent_folder_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<FolderRecord> for Folder {
    fn from(record: FolderRecord) -> Self {
        Folder {
            id: record.id,
            owner_id: record.owner_id,
            name: record.name,
            parent_folder_id: record.parent_folder_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

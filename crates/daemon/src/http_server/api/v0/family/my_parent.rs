use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::LinkedAccount;

use crate::auth::Requester;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct MyParentRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyParentResponse {
    pub parent: Option<LinkedAccount>,
}

/// The parent a child is linked to, if any.
pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
) -> Result<impl IntoResponse, MyParentError> {
    if !caller.is_child() {
        return Err(MyParentError::ChildrenOnly);
    }

    let parent = state.database().linked_parent(caller.id).await?;

    Ok(Json(MyParentResponse { parent }).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum MyParentError {
    #[error("operation requires the child role")]
    ChildrenOnly,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for MyParentError {
    fn into_response(self) -> Response {
        match self {
            MyParentError::ChildrenOnly => (
                http::StatusCode::FORBIDDEN,
                "operation requires the child role".to_string(),
            )
                .into_response(),
            MyParentError::Database(e) => database_error_response("MY PARENT", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for MyParentRequest {
    type Response = MyParentResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/family/parent").unwrap();
        client.get(full_url)
    }
}

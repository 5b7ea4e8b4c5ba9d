use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::{compose_profile, Profile, Role};

use crate::auth::Requester;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct MeRequest;

pub type MeResponse = Profile;

pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
) -> Result<impl IntoResponse, MeError> {
    let db = state.database();

    // A valid token for a deleted account is no longer a credential.
    let account = db
        .account_by_id(caller.id)
        .await?
        .ok_or(MeError::AccountGone)?;

    let (parent, children) = match account.role {
        Role::Child => (db.linked_parent(account.id).await?, Vec::new()),
        Role::Parent => (None, db.linked_children(account.id).await?),
    };

    let profile = compose_profile(
        account.id,
        account.name,
        account.email,
        account.role,
        account.created_at,
        parent,
        children,
    );

    Ok(Json(profile).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum MeError {
    #[error("account no longer exists")]
    AccountGone,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for MeError {
    fn into_response(self) -> Response {
        match self {
            MeError::AccountGone => (
                http::StatusCode::UNAUTHORIZED,
                "unauthorized".to_string(),
            )
                .into_response(),
            MeError::Database(e) => database_error_response("ME", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for MeRequest {
    type Response = MeResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/auth/me").unwrap();
        client.get(full_url)
    }
}

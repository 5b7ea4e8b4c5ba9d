use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::Requester;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::database_error_response;
use crate::ServiceState;

use super::{link_error_response, FamilyLinkError};

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct RedeemRequest {
    /// The invitation code to redeem
    #[arg(long)]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemResponse {
    pub parent_name: String,
    pub parent_email: String,
}

/// Redeem an invitation code as a child, linking the caller to the
/// issuing parent.
pub async fn handler(
    State(state): State<ServiceState>,
    Requester(caller): Requester,
    Json(req): Json<RedeemRequest>,
) -> Result<impl IntoResponse, RedeemError> {
    let (record, _edge) = state.linking().redeem_code(&caller, &req.code).await?;

    let parent = state
        .database()
        .account_by_id(record.parent_id)
        .await
        .map_err(RedeemError::Database)?
        .ok_or(RedeemError::ParentGone)?;

    Ok(Json(RedeemResponse {
        parent_name: parent.name,
        parent_email: parent.email,
    })
    .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum RedeemError {
    #[error("{0}")]
    Link(#[from] FamilyLinkError),
    /// The code's issuer was deleted between lookup and fetch.
    #[error("issuing account no longer exists")]
    ParentGone,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl IntoResponse for RedeemError {
    fn into_response(self) -> Response {
        match self {
            RedeemError::Link(e) => link_error_response(e),
            RedeemError::ParentGone => (
                http::StatusCode::NOT_FOUND,
                "issuing account no longer exists".to_string(),
            )
                .into_response(),
            RedeemError::Database(e) => database_error_response("REDEEM", &e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for RedeemRequest {
    type Response = RedeemResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/family/redeem").unwrap();
        client.post(full_url).json(&self)
    }
}

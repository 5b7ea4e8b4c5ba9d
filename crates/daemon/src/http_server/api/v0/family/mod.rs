use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;

pub mod dashboard;
pub mod generate_code;
pub mod leave;
pub mod my_parent;
pub mod redeem_code;
pub mod remove_child;

use common::prelude::LinkError;

use super::database_error_response;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/code", post(generate_code::handler))
        .route("/redeem", post(redeem_code::handler))
        .route("/dashboard", get(dashboard::handler))
        .route("/parent", get(my_parent::handler))
        .route("/leave", post(leave::handler))
        .route("/children/:child_id", delete(remove_child::handler))
        .with_state(state)
}

/// Both provider slots are the sqlite `Database` in the daemon.
pub type FamilyLinkError = LinkError<sqlx::Error, sqlx::Error>;

/// Shared status mapping for linking-engine failures.
pub(crate) fn link_error_response(err: FamilyLinkError) -> Response {
    match err {
        LinkError::Forbidden(role) => (
            StatusCode::FORBIDDEN,
            format!("operation requires the {} role", role),
        )
            .into_response(),
        LinkError::InvalidFormat(e) => {
            (StatusCode::BAD_REQUEST, format!("invalid code: {}", e)).into_response()
        }
        LinkError::NotFound => {
            (StatusCode::NOT_FOUND, "no such invitation code".to_string()).into_response()
        }
        LinkError::Expired => (
            StatusCode::GONE,
            "invitation code is no longer redeemable".to_string(),
        )
            .into_response(),
        LinkError::AlreadyLinked => (
            StatusCode::CONFLICT,
            "account is already linked to a parent".to_string(),
        )
            .into_response(),
        LinkError::Conflict => (
            StatusCode::CONFLICT,
            "could not commit a unique code, retry".to_string(),
        )
            .into_response(),
        LinkError::InviteStore(e) => database_error_response("FAMILY (invite store)", &e),
        LinkError::RelationshipStore(e) => {
            database_error_response("FAMILY (relationship store)", &e)
        }
    }
}

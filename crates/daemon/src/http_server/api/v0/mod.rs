use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;

pub mod access;
pub mod auth;
pub mod family;
pub(crate) mod fields;
pub mod folders;
pub mod notes;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/auth", auth::router(state.clone()))
        .nest("/family", family::router(state.clone()))
        .nest("/notes", notes::router(state.clone()))
        .nest("/folders", folders::router(state.clone()))
        .with_state(state)
}

/// Storage failures split into "retry later" and "bug": a database the
/// pool cannot reach answers 503, everything else is a plain 500.
pub(crate) fn database_error_response(context: &str, e: &sqlx::Error) -> Response {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            tracing::warn!("{} UNAVAILABLE: {}", context, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "service unavailable".to_string(),
            )
                .into_response()
        }
        _ => {
            tracing::error!("{} ERROR: {}", context, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_database_reports_service_unavailable() {
        let response = database_error_response("TEST", &sqlx::Error::PoolTimedOut);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = database_error_response("TEST", &sqlx::Error::PoolClosed);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn query_failures_stay_internal_errors() {
        let response = database_error_response("TEST", &sqlx::Error::RowNotFound);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

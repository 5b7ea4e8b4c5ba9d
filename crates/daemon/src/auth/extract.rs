use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;

use common::prelude::Identity;

use crate::ServiceState;

/// The verified caller, extracted from the Authorization header of any
/// authenticated endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Requester(pub Identity);

#[async_trait]
impl FromRequestParts<ServiceState> for Requester {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthRejection)?;

        let identity = state
            .tokens()
            .verify(bearer.token())
            .map_err(|e| {
                tracing::debug!("bearer token rejected: {}", e);
                AuthRejection
            })?;

        Ok(Requester(identity))
    }
}

/// Missing, malformed, expired or forged credentials all collapse into
/// the same 401 so callers learn nothing about which check failed.
#[derive(Debug)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let msg = serde_json::json!({"msg": "unauthorized"});
        (StatusCode::UNAUTHORIZED, Json(msg)).into_response()
    }
}

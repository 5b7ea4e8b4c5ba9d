use axum::response::{IntoResponse, Response};
use axum::Json;

use common::build_info;

pub async fn handler() -> Response {
    Json(build_info!()).into_response()
}

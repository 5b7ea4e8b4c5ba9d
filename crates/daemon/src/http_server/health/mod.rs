use axum::routing::get;
use axum::Router;

mod readyz;
mod versionz;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/readyz", get(readyz::handler))
        .route("/versionz", get(versionz::handler))
        .with_state(state)
}

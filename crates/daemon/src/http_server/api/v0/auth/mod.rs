use axum::routing::{get, post};
use axum::Router;

pub mod me;
pub mod signin;
pub mod signup;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/signup", post(signup::handler))
        .route("/signin", post(signin::handler))
        .route("/me", get(me::handler))
        .with_state(state)
}

use axum::{routing::post, Router};

use crate::handlers::auth_handlers::{login, signup};
use crate::state::AppState;

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .with_state(state)
}

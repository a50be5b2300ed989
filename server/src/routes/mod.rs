use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::auth_handlers::me;
use crate::middleware::auth_middleware::auth_middleware;
use crate::state::AppState;

pub mod auth;

/// Build the full application router.
///
/// `client_url` restricts CORS to one origin; with `None` no CORS layer is
/// installed.
pub fn app(state: AppState, client_url: Option<&str>) -> Router {
    let protected = Router::new()
        .route("/me", get(me))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let router = Router::new()
        .nest("/auth", auth::auth_routes(state))
        .nest("/api", protected)
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http());

    match client_url.and_then(|url| url.parse::<HeaderValue>().ok()) {
        Some(origin) => {
            let cors = CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true);
            router.layer(cors)
        }
        None => router,
    }
}

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::errors::AuthError;
use crate::handlers::auth_handlers::TOKEN_COOKIE;
use crate::state::AppState;

/// Pull the token from `Authorization: Bearer ...`, falling back to the
/// token cookie.
fn extract_token(req: &Request<Body>) -> Option<String> {
    let from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    from_header.or_else(|| {
        req.extensions()
            .get::<Cookies>()
            .and_then(|cookies| cookies.get(TOKEN_COOKIE))
            .map(|c| c.value().to_string())
    })
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_token(&req).ok_or_else(|| {
        tracing::debug!("Request without bearer token");
        AuthError::Authentication
    })?;

    let user = state.auth.authenticate(&token).await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

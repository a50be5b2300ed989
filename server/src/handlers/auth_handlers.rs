use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    Extension,
};
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies};

use crate::errors::AppResult;
use crate::models::user::{AuthPayload, User};
use crate::services::auth_service::SignupInput;
use crate::state::AppState;

/// Cookie carrying the bearer token for browser clients.
pub const TOKEN_COOKIE: &str = "axtoken";

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

fn set_token_cookie(cookies: &Cookies, token: &str) {
    let cookie = Cookie::build((TOKEN_COOKIE, token.to_string()))
        .http_only(true)
        .path("/")
        .build();
    cookies.add(cookie);
}

pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<SignupInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AuthPayload>)> {
    let Json(input) = payload?;
    let auth = state.auth.signup(input).await?;

    set_token_cookie(&cookies, &auth.token);
    Ok((StatusCode::CREATED, Json(auth)))
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> AppResult<Json<AuthPayload>> {
    let Json(payload) = payload?;
    let auth = state.auth.login(&payload.email, &payload.password).await?;

    set_token_cookie(&cookies, &auth.token);
    Ok(Json(auth))
}

/// The user resolved by the auth middleware.
pub async fn me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

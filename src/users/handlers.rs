use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::cookie::{
    clear_cookie, get_cookie, session_cookie, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME,
};
use crate::auth::extractors::CurrentUser;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::users::dto::{LoginRequest, RefreshRequest, RegisterInput, TokenPair};
use crate::users::repo_types::Profile;
use crate::users::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/refresh-token", post(refresh))
        .route("/users/logout", post(logout))
        .route("/users/me", get(me))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

fn session_cookies(state: &AppState, tokens: &TokenPair) -> AppendHeaders<[(axum::http::HeaderName, String); 2]> {
    let jwt = &state.config.jwt;
    let access_ttl = Duration::from_secs((jwt.access_ttl_minutes as u64) * 60);
    let refresh_ttl = Duration::from_secs((jwt.refresh_ttl_days as u64) * 24 * 60 * 60);
    AppendHeaders([
        (
            SET_COOKIE,
            session_cookie(ACCESS_COOKIE_NAME, &tokens.access_token, access_ttl),
        ),
        (
            SET_COOKIE,
            session_cookie(REFRESH_COOKIE_NAME, &tokens.refresh_token, refresh_ttl),
        ),
    ])
}

/// POST /users/register (multipart)
/// Text fields: fullName, email, username, password.
/// File fields: avatar (required), coverImage (optional); first item wins.
#[instrument(skip(state, mp))]
pub async fn register(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<ApiResponse<Profile>, ApiError> {
    let mut input = RegisterInput::default();

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|_| ApiError::validation("malformed multipart body"))?
    {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };
        let read_text = |e| {
            tracing::warn!(field = %name, error = %e, "unreadable multipart field");
            ApiError::validation(format!("unreadable field {name}"))
        };
        match name.as_str() {
            "fullName" => input.full_name = field.text().await.map_err(read_text)?,
            "email" => input.email = field.text().await.map_err(read_text)?,
            "username" => input.username = field.text().await.map_err(read_text)?,
            "password" => input.password = field.text().await.map_err(read_text)?,
            "avatar" if input.avatar_path.is_none() => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field.bytes().await.map_err(read_text)?;
                input.avatar_path = Some(state.uploader.stage(data, &content_type).await?);
            }
            "coverImage" if input.cover_image_path.is_none() => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field.bytes().await.map_err(read_text)?;
                input.cover_image_path = Some(state.uploader.stage(data, &content_type).await?);
            }
            _ => {}
        }
    }

    let profile = services::register_user(&state, input).await?;
    Ok(ApiResponse::created(profile, "user registered successfully"))
}

/// POST /users/login — tokens go out both in the body and as cookies.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let data = services::login_user(&state, payload).await?;
    let cookies = session_cookies(
        &state,
        &TokenPair {
            access_token: data.access_token.clone(),
            refresh_token: data.refresh_token.clone(),
        },
    );
    Ok((cookies, ApiResponse::ok(data, "user logged in successfully")))
}

/// POST /users/refresh-token — token from the cookie, or the body for
/// non-browser clients.
#[instrument(skip(state, headers, body))]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let presented = get_cookie(&headers, REFRESH_COOKIE_NAME)
        .map(str::to_string)
        .or_else(|| body.and_then(|Json(b)| b.refresh_token));

    let tokens = services::refresh_session(&state, presented.as_deref()).await?;
    let cookies = session_cookies(&state, &tokens);
    Ok((cookies, ApiResponse::ok(tokens, "access token refreshed")))
}

/// POST /users/logout — protected; clears the stored refresh token and both
/// cookies.
#[instrument(skip(state, user))]
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    services::logout_user(&state, user.0.id).await?;
    let cookies = AppendHeaders([
        (SET_COOKIE, clear_cookie(ACCESS_COOKIE_NAME)),
        (SET_COOKIE, clear_cookie(REFRESH_COOKIE_NAME)),
    ]);
    Ok((
        cookies,
        ApiResponse::ok(serde_json::json!({}), "user logged out"),
    ))
}

/// GET /users/me — the identity resolved by the authorization layer.
#[instrument(skip(user))]
pub async fn me(user: CurrentUser) -> ApiResponse<Profile> {
    ApiResponse::ok(user.0, "current user fetched")
}

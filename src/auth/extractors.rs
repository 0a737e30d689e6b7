use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::cookie::{get_cookie, ACCESS_COOKIE_NAME};
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo_types::Profile;

/// Identity attached to every protected request: the caller's sanitized
/// profile, resolved from a verified access token. Expired tokens are never
/// refreshed here; clients go through the refresh endpoint.
pub struct CurrentUser(pub Profile);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Cookie first; Bearer header for non-browser clients.
        let token = get_cookie(&parts.headers, ACCESS_COOKIE_NAME)
            .or_else(|| {
                parts
                    .headers
                    .get(axum::http::header::AUTHORIZATION)
                    .and_then(|h| h.to_str().ok())
                    .and_then(|h| h.strip_prefix("Bearer "))
            })
            .ok_or_else(|| ApiError::unauthorized("unauthorized request"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify_access(token).map_err(|e| {
            warn!(error = %e, "access token rejected");
            ApiError::unauthorized("invalid access token")
        })?;

        let profile = state
            .users
            .find_profile(claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("invalid access token"))?;

        Ok(CurrentUser(profile))
    }
}

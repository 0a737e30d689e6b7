use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{LoginData, LoginRequest, RegisterInput, TokenPair};
use crate::users::repo_types::{NewUser, Profile};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn require_field(value: &str, name: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{name} is required")));
    }
    Ok(())
}

/// Validate input, enforce uniqueness, ingest images, create the user and
/// return the sanitized profile.
pub async fn register_user(state: &AppState, input: RegisterInput) -> Result<Profile, ApiError> {
    require_field(&input.full_name, "fullName")?;
    require_field(&input.email, "email")?;
    require_field(&input.username, "username")?;
    require_field(&input.password, "password")?;
    if !is_valid_email(input.email.trim()) {
        return Err(ApiError::validation("email is malformed"));
    }

    let username = input.username.trim().to_lowercase();
    let email = input.email.trim().to_string();

    if let Some(existing) = state
        .users
        .find_by_identifier(Some(&username), Some(&email))
        .await?
    {
        warn!(user_id = %existing.id, "registration hit existing username or email");
        return Err(ApiError::conflict(
            "user with this email or username already exists",
        ));
    }

    let avatar_path = input
        .avatar_path
        .as_deref()
        .ok_or_else(|| ApiError::validation("avatar file is required"))?;

    // Both staged files go through the uploader so each is removed exactly
    // once, whatever the transfer outcome. Cover failure is non-fatal.
    let avatar_res = state.uploader.upload(avatar_path).await;
    let cover_image_url = match input.cover_image_path.as_deref() {
        Some(path) => state.uploader.upload(path).await.unwrap_or_else(|e| {
            warn!(error = %e, "cover image upload failed, continuing without");
            String::new()
        }),
        None => String::new(),
    };
    let avatar_url = avatar_res.map_err(|e| {
        error!(error = %e, "avatar upload failed");
        ApiError::upload("avatar upload failed")
    })?;

    let password_hash = hash_password(&input.password)?;
    let user = state
        .users
        .create(NewUser {
            username,
            email,
            full_name: input.full_name.trim().to_string(),
            password_hash,
            avatar_url,
            cover_image_url,
        })
        .await?;

    let profile = state.users.find_profile(user.id).await?.ok_or_else(|| {
        error!(user_id = %user.id, "created user vanished on re-read");
        ApiError::internal("something went wrong while registering the user")
    })?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(profile)
}

/// Verify credentials, mint a session and return the sanitized profile with
/// the token pair.
pub async fn login_user(state: &AppState, req: LoginRequest) -> Result<LoginData, ApiError> {
    let username = req
        .username
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if username.is_none() && email.is_none() {
        return Err(ApiError::validation("username or email is required"));
    }

    let user = state
        .users
        .find_by_identifier(username.as_deref(), email.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("user does not exist"))?;

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::unauthorized("invalid user credentials"));
    }

    let tokens = issue_session(state, user.id).await?;

    let profile = state
        .users
        .find_profile(user.id)
        .await?
        .ok_or_else(|| ApiError::internal("failed to load user after login"))?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(LoginData {
        user: profile,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    })
}

/// Mint an access/refresh pair for a user and persist the refresh token on
/// their record. The caller has already established the user exists, so a
/// failed lookup here is a server fault.
pub async fn issue_session(state: &AppState, user_id: Uuid) -> Result<TokenPair, ApiError> {
    let user = state.users.find_by_id(user_id).await?.ok_or_else(|| {
        error!(%user_id, "user missing while issuing session");
        ApiError::internal("failed to issue session tokens")
    })?;

    let keys = JwtKeys::from_config(&state.config.jwt);
    let access_token = keys.sign_access(&user)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    state
        .users
        .set_refresh_token(user.id, Some(&refresh_token))
        .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Validate a presented refresh token, reject stale or reused copies, and
/// rotate the pair.
pub async fn refresh_session(
    state: &AppState,
    presented: Option<&str>,
) -> Result<TokenPair, ApiError> {
    let presented = presented
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("refresh token is required"))?;

    let keys = JwtKeys::from_config(&state.config.jwt);
    let claims = keys.verify_refresh(presented).map_err(|e| {
        warn!(error = %e, "refresh token rejected");
        ApiError::unauthorized("invalid or expired refresh token")
    })?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid refresh token"))?;

    // Reuse detection: only the most recently issued token matches the
    // stored value. Anything older was superseded by a later issue.
    if user.refresh_token.as_deref() != Some(presented) {
        warn!(user_id = %user.id, "stale or reused refresh token presented");
        return Err(ApiError::unauthorized(
            "refresh token is expired or already used",
        ));
    }

    let tokens = issue_session(state, user.id).await?;
    info!(user_id = %user.id, "session refreshed");
    Ok(tokens)
}

/// Invalidate the stored refresh token. Safe to call repeatedly.
pub async fn logout_user(state: &AppState, user_id: Uuid) -> Result<(), ApiError> {
    state.users.set_refresh_token(user_id, None).await?;
    info!(%user_id, "user logged out");
    Ok(())
}

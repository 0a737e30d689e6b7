use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::users::repo_types::Profile;

/// Registration input once the multipart boundary has staged the files: four
/// text fields plus local paths of the staged images.
#[derive(Debug, Default)]
pub struct RegisterInput {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub avatar_path: Option<PathBuf>,
    pub cover_image_path: Option<PathBuf>,
}

/// Login body: password plus at least one identifier.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Refresh body for non-browser clients; browsers send the cookie instead.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Freshly minted access/refresh pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Login payload: sanitized profile plus the token pair, mirrored into
/// cookies by the handler.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: Profile,
    pub access_token: String,
    pub refresh_token: String,
}

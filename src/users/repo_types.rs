use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record as owned by the credential store. `password_hash` and
/// `refresh_token` never serialize; outward-facing code returns [`Profile`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar_url: String,
    /// Empty string when the user registered without a cover image.
    pub cover_image_url: String,
    /// Raw value of the most recently issued refresh token, or None after
    /// logout. At most one refresh token is valid per user.
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub watch_history: Vec<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Sanitized projection of a user: everything except `password_hash` and
/// `refresh_token`, in the platform's wire format.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: String,
    pub watch_history: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields supplied by RegistrationService when creating a user. The store
/// assigns `id` and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub cover_image_url: String,
}

#[cfg(test)]
impl User {
    pub fn test_fixture(username: &str, email: &str, full_name: &str, password_hash: &str) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            full_name: full_name.into(),
            password_hash: password_hash.into(),
            avatar_url: "https://cdn.test/streamhub/media/avatar.png".into(),
            cover_image_url: String::new(),
            refresh_token: None,
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, Profile, User};

/// Abstract credential store. The core only ever talks to this boundary;
/// reads and writes are atomic per record, nothing more is assumed.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user matching either identifier. Absent identifiers never match.
    async fn find_by_identifier(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> anyhow::Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    /// Sanitized re-read: the record with `password_hash` and `refresh_token`
    /// excluded.
    async fn find_profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>>;

    async fn create(&self, new: NewUser) -> anyhow::Result<User>;

    /// Single-field update of the stored refresh token. `None` clears it.
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> anyhow::Result<()>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str = "id, username, email, full_name, password_hash, avatar_url, \
     cover_image_url, refresh_token, watch_history, created_at, updated_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_identifier(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE username = $1 OR email = $2
            "#,
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, username, email, full_name,
                   avatar_url AS avatar, cover_image_url AS cover_image,
                   watch_history, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(profile)
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, full_name, password_hash, avatar_url, cover_image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(&new.password_hash)
        .bind(&new.avatar_url)
        .bind(&new.cover_image_url)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

/// In-memory store backing `AppState::fake()`. Same per-record atomicity as
/// the real store: one lock acquisition per operation.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sanitize(user: &User) -> Profile {
    Profile {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        full_name: user.full_name.clone(),
        avatar: user.avatar_url.clone(),
        cover_image: user.cover_image_url.clone(),
        watch_history: user.watch_history.clone(),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_identifier(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| {
                username.is_some_and(|n| u.username == n) || email.is_some_and(|e| u.email == e)
            })
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(sanitize))
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            full_name: new.full_name,
            password_hash: new.password_hash,
            avatar_url: new.avatar_url,
            cover_image_url: new.cover_image_url,
            refresh_token: None,
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let mut users = self.users.write().await;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> anyhow::Result<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("no user with id {id}"))?;
        user.refresh_token = token.map(Into::into);
        user.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}

use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState, users::repo_types::User};

/// Access-token payload: enough profile to serve a request without a user
/// lookup on the hot path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// Refresh-token payload: identity plus a token id. The `jti` makes every
/// issued token distinct, so a superseded token never compares equal to its
/// replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub jti: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// Signs and verifies the two token classes against distinct secrets.
/// A token signed with one secret never verifies against the other.
#[derive(Clone)]
pub struct JwtKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    issuer: String,
    audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(cfg.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(cfg.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(cfg.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(cfg.refresh_secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::from_secs((cfg.access_ttl_minutes as u64) * 60),
            refresh_ttl: Duration::from_secs((cfg.refresh_ttl_days as u64) * 24 * 60 * 60),
        }
    }

    pub fn sign_access(&self, user: &User) -> anyhow::Result<String> {
        let (iat, exp) = self.window(self.access_ttl);
        let claims = AccessClaims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            iat,
            exp,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.access_encoding)?;
        debug!(user_id = %user.id, "access token signed");
        Ok(token)
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        let (iat, exp) = self.window(self.refresh_ttl);
        let claims = RefreshClaims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat,
            exp,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.refresh_encoding)?;
        debug!(user_id = %user_id, "refresh token signed");
        Ok(token)
    }

    pub fn verify_access(&self, token: &str) -> anyhow::Result<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.access_decoding, &self.validation())?;
        debug!(user_id = %data.claims.sub, "access token verified");
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<RefreshClaims> {
        let data = decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation())?;
        debug!(user_id = %data.claims.sub, "refresh token verified");
        Ok(data.claims)
    }

    fn window(&self, ttl: Duration) -> (usize, usize) {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        (now.unix_timestamp() as usize, exp.unix_timestamp() as usize)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            access_secret: "access-secret".into(),
            refresh_secret: "refresh-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 10,
        })
    }

    fn make_user() -> User {
        User::test_fixture("annl", "ann@x.com", "Ann Lee", "hash")
    }

    #[test]
    fn sign_and_verify_access_token() {
        let keys = make_keys();
        let user = make_user();
        let token = keys.sign_access(&user).expect("sign access");
        let claims = keys.verify_access(&token).expect("verify access");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "annl");
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.full_name, "Ann Lee");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[test]
    fn sign_and_verify_refresh_token() {
        let keys = make_keys();
        let user = make_user();
        let token = keys.sign_refresh(user.id).expect("sign refresh");
        let claims = keys.verify_refresh(&token).expect("verify refresh");
        assert_eq!(claims.sub, user.id);
    }

    #[test]
    fn refresh_tokens_are_distinct_per_issue() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let a = keys.sign_refresh(user_id).expect("sign refresh");
        let b = keys.sign_refresh(user_id).expect("sign refresh");
        assert_ne!(a, b, "each issued refresh token must be unique");
    }

    #[test]
    fn access_token_does_not_verify_as_refresh() {
        let keys = make_keys();
        let user = make_user();
        let access = keys.sign_access(&user).expect("sign access");
        assert!(keys.verify_refresh(&access).is_err());
    }

    #[test]
    fn refresh_token_does_not_verify_as_access() {
        let keys = make_keys();
        let refresh = keys.sign_refresh(Uuid::new_v4()).expect("sign refresh");
        assert!(keys.verify_access(&refresh).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let keys = make_keys();
        let other = JwtKeys::from_config(&JwtConfig {
            access_secret: "other-access".into(),
            refresh_secret: "other-refresh".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 10,
        });
        let user = make_user();
        let token = keys.sign_access(&user).expect("sign access");
        assert!(other.verify_access(&token).is_err());
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let keys = make_keys();
        let user = make_user();
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        // Expired an hour ago, well past any validation leeway.
        let claims = AccessClaims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            iat: now - 7200,
            exp: now - 3600,
            iss: "test-issuer".into(),
            aud: "test-aud".into(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"access-secret"),
        )
        .unwrap();
        assert!(keys.verify_access(&token).is_err());
    }
}

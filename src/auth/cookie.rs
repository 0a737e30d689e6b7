//! Session cookie names, builders and parsing.

use std::time::Duration;

use axum::http::{header, HeaderMap};

/// Cookie carrying the short-lived access token.
pub const ACCESS_COOKIE_NAME: &str = "accessToken";

/// Cookie carrying the long-lived refresh token.
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Set-Cookie value for a session token. Tokens are only ever delivered
/// HttpOnly and Secure.
pub fn session_cookie(name: &str, value: &str, max_age: Duration) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={}",
        name,
        value,
        max_age.as_secs()
    )
}

/// Set-Cookie value that removes a session token.
pub fn clear_cookie(name: &str) -> String {
    format!(
        "{}=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0",
        name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_get_cookie_simple() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("accessToken=abc"));
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE_NAME), Some("abc"));
    }

    #[test]
    fn test_get_cookie_multiple() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; accessToken=abc; refreshToken=xyz"),
        );
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE_NAME), Some("abc"));
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE_NAME), Some("xyz"));
    }

    #[test]
    fn test_get_cookie_absent() {
        let headers = HeaderMap::new();
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE_NAME), None);
    }

    #[test]
    fn test_get_cookie_with_spaces() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("  accessToken = abc  ; foo=bar"),
        );
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE_NAME), Some("abc"));
    }

    #[test]
    fn session_cookie_is_http_only_and_secure() {
        let c = session_cookie(ACCESS_COOKIE_NAME, "tok", Duration::from_secs(900));
        assert!(c.starts_with("accessToken=tok;"));
        assert!(c.contains("HttpOnly"));
        assert!(c.contains("Secure"));
        assert!(c.contains("Max-Age=900"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let c = clear_cookie(REFRESH_COOKIE_NAME);
        assert!(c.starts_with("refreshToken=;"));
        assert!(c.contains("Max-Age=0"));
    }
}

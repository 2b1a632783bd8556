//! Password hashing and login sessions
//!
//! Sessions are an in-process map from a random token to the logged-in
//! identity, carried in an HttpOnly cookie. They do not survive a restart.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::http::{HeaderMap, header};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::models::Role;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "sid";

/// Hash a password into PHC string format.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Identity attached to an active session
#[derive(Debug, Clone)]
pub struct SessionData {
    pub username: String,
    pub role: Role,
}

/// In-process session map. Cheap to clone and injected into handlers.
#[derive(Clone, Default)]
pub struct Sessions {
    inner: Arc<RwLock<HashMap<String, SessionData>>>,
}

impl Sessions {
    /// Create a session and return its token.
    pub fn create(&self, username: &str, role: Role) -> String {
        let token = Uuid::new_v4().to_string();
        let data = SessionData {
            username: username.to_string(),
            role,
        };
        self.inner
            .write()
            .expect("session map lock poisoned")
            .insert(token.clone(), data);
        token
    }

    /// Resolve a token to its identity.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<SessionData> {
        self.inner
            .read()
            .expect("session map lock poisoned")
            .get(token)
            .cloned()
    }

    /// Drop a session, if it exists.
    pub fn remove(&self, token: &str) {
        self.inner
            .write()
            .expect("session map lock poisoned")
            .remove(token);
    }

    /// Resolve the identity of a request from its Cookie header.
    #[must_use]
    pub fn identify(&self, headers: &HeaderMap) -> Option<SessionData> {
        token_from_headers(headers).and_then(|token| self.get(&token))
    }
}

/// Set-Cookie value establishing a session.
#[must_use]
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// Set-Cookie value clearing the session cookie.
#[must_use]
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Extract the session token from a request's Cookie header.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }

    #[test]
    fn test_session_lifecycle() {
        let sessions = Sessions::default();
        let token = sessions.create("admin", Role::Admin);

        let data = sessions.get(&token).unwrap();
        assert_eq!(data.username, "admin");
        assert_eq!(data.role, Role::Admin);

        sessions.remove(&token);
        assert!(sessions.get(&token).is_none());
    }

    #[test]
    fn test_token_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; sid=abc-123; lang=en"),
        );
        assert_eq!(token_from_headers(&headers), Some("abc-123".to_string()));

        let mut no_session = HeaderMap::new();
        no_session.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(token_from_headers(&no_session), None);

        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_identify_round_trip() {
        let sessions = Sessions::default();
        let token = sessions.create("admin", Role::Admin);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("sid={token}")).unwrap(),
        );
        assert_eq!(sessions.identify(&headers).unwrap().username, "admin");
    }
}

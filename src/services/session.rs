use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, Validation};
use serde::Deserialize;

use crate::config::SessionSeed;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "usuario";
pub const ROLES_KEY: &str = "roles";

/// Logged-in user as stored by the login page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id_usuario: Option<i64>,
    pub nombre_completo: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: Option<i64>,
}

/// Key/value session storage (browser `localStorage` in the web build).
///
/// Implementors only provide raw access; everything else is derived from
/// the well-known keys.
pub trait SessionStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);

    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// A session is authenticated as soon as a non-empty token is stored.
    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    fn current_user(&self) -> Option<SessionUser> {
        let raw = self.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Stored session user is not valid JSON: {}", e);
                None
            }
        }
    }

    fn roles(&self) -> Vec<String> {
        let Some(raw) = self.get(ROLES_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Stored session roles are not valid JSON: {}", e);
            Vec::new()
        })
    }

    fn has_role(&self, role: &str) -> bool {
        self.roles().iter().any(|r| r == role)
    }

    fn has_any_role(&self, roles: &[&str]) -> bool {
        let held = self.roles();
        roles.iter().any(|wanted| held.iter().any(|r| r == wanted))
    }

    /// Forget token, user and roles.
    fn clear(&self) {
        self.remove(TOKEN_KEY);
        self.remove(USER_KEY);
        self.remove(ROLES_KEY);
    }

    /// `exp` claim of the stored JWT. The signature is not checked; the
    /// client only needs to know when the backend will start answering 401.
    fn token_expiry(&self) -> Option<DateTime<Utc>> {
        let token = self.token()?;

        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<TokenClaims>(
            &token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )
        .ok()?;
        DateTime::from_timestamp(data.claims.exp?, 0)
    }

    /// True when the token expires within `window` of `now` (or already has).
    fn is_expiring_soon(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match self.token_expiry() {
            Some(exp) => exp - now <= window,
            None => false,
        }
    }
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: &SessionSeed) -> Self {
        let store = Self::new();
        if let Some(token) = &seed.token {
            store.set(TOKEN_KEY, token.clone());
        }
        if let Some(user) = &seed.user_json {
            store.set(USER_KEY, user.clone());
        }
        if let Some(roles) = &seed.roles_json {
            store.set(ROLES_KEY, roles.clone());
        }
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.values.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.values.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.write().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.write().remove(key);
    }
}

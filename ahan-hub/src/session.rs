//! Session guard
//!
//! Sessions live in process memory, keyed by an opaque token carried in a
//! browser-session cookie (no expiry attribute). Each session holds a string
//! map, where the admin flag is stored as `"true"`/`"false"` under `isAdmin`,
//! and the admin's editor workspace. A session is opened by a successful login
//! and closed by logout.

use ahan_common::config::{sha256_hex, AdminConfig};
use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::admin::AdminWorkspace;

/// Session key of the admin flag
pub const ADMIN_FLAG: &str = "isAdmin";

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "ahan_session";

#[derive(Debug)]
pub struct SessionData {
    values: HashMap<String, String>,
    pub workspace: AdminWorkspace,
}

/// In-memory session storage
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionData>>,
    confirmation_delay: Duration,
}

impl SessionStore {
    pub fn new(confirmation_delay: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            confirmation_delay,
        }
    }

    /// Start a new session with the admin flag cleared. Returns its token.
    pub async fn open_session(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let mut values = HashMap::new();
        values.insert(ADMIN_FLAG.to_string(), "false".to_string());

        self.sessions.lock().await.insert(
            token.clone(),
            SessionData {
                values,
                workspace: AdminWorkspace::new(self.confirmation_delay),
            },
        );
        debug!("Opened session");
        token
    }

    pub async fn contains(&self, token: &str) -> bool {
        self.sessions.lock().await.contains_key(token)
    }

    pub async fn get_item(&self, token: &str, key: &str) -> Option<String> {
        self.sessions
            .lock()
            .await
            .get(token)
            .and_then(|session| session.values.get(key).cloned())
    }

    /// Returns false if the session does not exist
    pub async fn set_item(&self, token: &str, key: &str, value: &str) -> bool {
        match self.sessions.lock().await.get_mut(token) {
            Some(session) => {
                session.values.insert(key.to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    /// Run `f` against the session's data while holding the store lock.
    /// `f` must not await.
    pub async fn with_session<R>(
        &self,
        token: &str,
        f: impl FnOnce(&mut SessionData) -> R,
    ) -> Option<R> {
        self.sessions.lock().await.get_mut(token).map(f)
    }

    pub async fn close_session(&self, token: &str) {
        if self.sessions.lock().await.remove(token).is_some() {
            debug!("Closed session");
        }
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Token from the request's `Cookie` header, if present
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value for a session token; no `Max-Age` so it ends with the browser session
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// `Set-Cookie` value that makes the browser drop the session cookie
pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Session-scoped authentication state
#[async_trait]
pub trait AuthContext: Send + Sync {
    async fn is_authenticated(&self) -> bool;

    async fn login(&self);

    async fn logout(&self);
}

/// `AuthContext` over one session of a `SessionStore`
#[derive(Debug, Clone, Copy)]
pub struct SessionAuth<'a> {
    store: &'a SessionStore,
    token: &'a str,
}

impl<'a> SessionAuth<'a> {
    pub fn new(store: &'a SessionStore, token: &'a str) -> Self {
        Self { store, token }
    }
}

#[async_trait]
impl AuthContext for SessionAuth<'_> {
    async fn is_authenticated(&self) -> bool {
        self.store.get_item(self.token, ADMIN_FLAG).await.as_deref() == Some("true")
    }

    async fn login(&self) {
        self.store.set_item(self.token, ADMIN_FLAG, "true").await;
    }

    async fn logout(&self) {
        self.store.set_item(self.token, ADMIN_FLAG, "false").await;
    }
}

/// Verifies admin credentials before `AuthContext::login`
pub trait CredentialCheck: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Username and SHA-256 password digest from the `[admin]` config section
#[derive(Debug, Clone)]
pub struct ConfiguredCredentials {
    username: String,
    password_sha256: String,
}

impl ConfiguredCredentials {
    pub fn new(username: impl Into<String>, password_sha256: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_sha256: password_sha256.into().to_ascii_lowercase(),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        let credentials = Self::new(&config.username, &config.password_sha256);
        if credentials.password_sha256.is_empty() {
            warn!("No admin password configured; admin login is disabled");
        } else {
            info!("Admin login enabled for user '{}'", credentials.username);
        }
        credentials
    }
}

impl CredentialCheck for ConfiguredCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        !self.password_sha256.is_empty()
            && username == self.username
            && sha256_hex(password) == self.password_sha256
    }
}

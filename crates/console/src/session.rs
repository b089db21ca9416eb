//! Session store: the operator's bearer credential.
//!
//! Every credential change is mirrored into [`LocalStorage`] under
//! [`TOKEN_KEY`], or the entry is removed when the credential is cleared.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use common::types::ErrorBody;

use crate::errors::ConsoleError;
use crate::storage::LocalStorage;

pub const TOKEN_KEY: &str = "authToken";

const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Exchanges operator credentials for a bearer token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<String, ConsoleError>;
}

/// Offline login against a single fixed operator.
pub struct StaticAuthenticator {
    username: String,
    password: String,
}

impl StaticAuthenticator {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl Default for StaticAuthenticator {
    fn default() -> Self { Self::new("admin", "password123") }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<String, ConsoleError> {
        if username == self.username && password == self.password {
            let encoded = base64::engine::general_purpose::STANDARD.encode(username);
            Ok(format!("fake-jwt-token.{encoded}.{}", chrono::Utc::now().timestamp_millis()))
        } else {
            Err(ConsoleError::Auth(INVALID_CREDENTIALS.into()))
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// `POST {base}/auth/login` with `{ username, password }`, expecting `{ token }`.
pub struct RemoteAuthenticator {
    http: reqwest::Client,
    login_url: String,
}

impl RemoteAuthenticator {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self { http, login_url: format!("{}/auth/login", base_url.trim_end_matches('/')) }
    }
}

#[async_trait]
impl Authenticator for RemoteAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<String, ConsoleError> {
        let resp = self
            .http
            .post(&self.login_url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            let body: LoginResponse = resp.json().await?;
            return Ok(body.token);
        }
        let message = resp
            .json::<ErrorBody>()
            .await
            .map(|b| b.message)
            .unwrap_or_else(|_| INVALID_CREDENTIALS.to_string());
        Err(ConsoleError::Auth(message))
    }
}

#[derive(Default)]
struct SessionState {
    token: Option<String>,
    loading: bool,
    auth_error: Option<String>,
}

struct SessionInner {
    state: RwLock<SessionState>,
    storage: Arc<dyn LocalStorage>,
    authenticator: Arc<dyn Authenticator>,
}

/// Clears the loading flag when a login attempt ends on any path.
struct LoadingGuard<'a>(&'a SessionStore);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) { self.0.write(|s| s.loading = false); }
}

/// Shared handle; clones observe the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl SessionStore {
    /// Build a session, picking up a credential persisted by an earlier run.
    pub async fn restore(storage: Arc<dyn LocalStorage>, authenticator: Arc<dyn Authenticator>) -> Self {
        let token = storage.get(TOKEN_KEY).await.filter(|t| !t.is_empty());
        if token.is_some() {
            info!("restored persisted session");
        }
        Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(SessionState { token, ..SessionState::default() }),
                storage,
                authenticator,
            }),
        }
    }

    pub fn token(&self) -> Option<String> { self.read(|s| s.token.clone()) }

    pub fn is_authenticated(&self) -> bool { self.read(|s| s.token.is_some()) }

    /// Error message from the most recent failed login.
    pub fn auth_error(&self) -> Option<String> { self.read(|s| s.auth_error.clone()) }

    pub fn is_loading(&self) -> bool { self.read(|s| s.loading) }

    /// On failure the error message is recorded and any credential is cleared.
    /// The credential is only kept in memory once it has been persisted.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ConsoleError> {
        self.write(|s| {
            s.loading = true;
            s.auth_error = None;
        });
        let _guard = LoadingGuard(self);

        match self.inner.authenticator.authenticate(username, password).await {
            Ok(token) => {
                self.inner.storage.set(TOKEN_KEY, &token).await?;
                self.write(|s| s.token = Some(token));
                info!("login succeeded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                self.write(|s| {
                    s.auth_error = Some(e.to_string());
                    s.token = None;
                });
                if let Err(storage_err) = self.inner.storage.remove(TOKEN_KEY).await {
                    warn!(error = %storage_err, "could not clear persisted credential");
                }
                Err(e)
            }
        }
    }

    pub async fn logout(&self) -> Result<(), ConsoleError> {
        info!("logout");
        self.write(|s| s.token = None);
        self.inner.storage.remove(TOKEN_KEY).await
    }

    fn read<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        f(&self.inner.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write(&self, f: impl FnOnce(&mut SessionState)) {
        f(&mut self.inner.state.write().unwrap_or_else(PoisonError::into_inner))
    }
}

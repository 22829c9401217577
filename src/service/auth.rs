//! Authentication flows: login, register, token refresh, logout.
//!
//! On login the bearer token goes into the shared `TokenStore` (read by
//! the transport on every call) and the session is persisted to disk so
//! a restart doesn't force a fresh login. Logout clears the token, the
//! session file, and the whole response cache.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{Session, SessionData};
use crate::cache::ResponseCache;
use crate::models::{AuthResponse, LoginRequest, RefreshResponse, RegisterRequest, User};

pub struct AuthService {
    client: ApiClient,
    cache: Arc<ResponseCache>,
    session: Mutex<Session>,
    current_user: Mutex<Option<User>>,
}

impl AuthService {
    /// Build the service and restore any persisted, non-expired session
    /// into the token store.
    pub fn new(client: ApiClient, cache: Arc<ResponseCache>, cache_dir: PathBuf) -> Self {
        let mut session = Session::new(cache_dir);
        match session.load() {
            Ok(true) => {
                if let Some(token) = session.token() {
                    client.tokens().set(token);
                    info!("Restored persisted session");
                }
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Failed to load persisted session"),
        }

        Self {
            client,
            cache,
            session: Mutex::new(session),
            current_user: Mutex::new(None),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.tokens().is_set()
    }

    /// True when the persisted session is close enough to expiry that a
    /// refresh should be attempted.
    pub fn needs_refresh(&self) -> bool {
        self.session
            .lock()
            .unwrap()
            .data
            .as_ref()
            .map(SessionData::needs_refresh)
            .unwrap_or(false)
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_user.lock().unwrap().clone()
    }

    fn store_token(&self, token: &str, username: &str) {
        self.client.tokens().set(token);
        let mut session = self.session.lock().unwrap();
        session.update(SessionData::new(token, username));
        if let Err(e) = session.save() {
            warn!(error = %e, "Failed to persist session");
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self.client.post("/auth/login", &request).await?;

        if let Some(token) = response.token.as_deref().filter(|t| !t.is_empty()) {
            self.store_token(token, email);
            *self.current_user.lock().unwrap() = response.user.clone();
            info!(user = email, "Logged in");
        }
        Ok(response)
    }

    /// Create an account. Does not log in implicitly.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.client.post("/auth/register", request).await
    }

    /// Exchange the current token for a fresh one. A failed refresh ends
    /// the session (the caller gets the error and should re-login).
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let result: Result<RefreshResponse, ApiError> = self
            .client
            .post("/auth/refresh", &serde_json::json!({}))
            .await;

        match result {
            Ok(response) => {
                let username = self
                    .session
                    .lock()
                    .unwrap()
                    .data
                    .as_ref()
                    .map(|d| d.username.clone())
                    .unwrap_or_default();
                self.store_token(&response.token, &username);
                Ok(())
            }
            Err(e) => {
                warn!("Token refresh failed - logging out");
                self.logout();
                Err(e)
            }
        }
    }

    /// End the session: clear the token, the session file, and every
    /// cached response.
    pub fn logout(&self) {
        self.client.tokens().clear();
        *self.current_user.lock().unwrap() = None;
        if let Err(e) = self.session.lock().unwrap().clear() {
            warn!(error = %e, "Failed to remove session file");
        }
        self.cache.invalidate(None);
        info!("Logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenStore;
    use crate::notify::MemorySink;
    use serde_json::json;

    fn service() -> AuthService {
        let tokens = TokenStore::new();
        let client = ApiClient::new("http://localhost:0", tokens, Arc::new(MemorySink::new()))
            .expect("client should build");
        let dir = std::env::temp_dir().join("haulbook-auth-test");
        AuthService::new(client, Arc::new(ResponseCache::new()), dir)
    }

    #[test]
    fn test_logout_clears_token_and_cache() {
        let auth = service();
        auth.client.tokens().set("jwt");
        auth.cache.put("/parties", json!([1]));
        assert!(auth.is_authenticated());

        auth.logout();
        assert!(!auth.is_authenticated());
        assert!(auth.cache.is_empty());
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_needs_refresh_without_session() {
        let auth = service();
        assert!(!auth.needs_refresh());
    }
}

use std::sync::{Arc, RwLock};

/// Process-wide holder for the current bearer token.
///
/// The transport layer reads the token before every request, so a login,
/// refresh, or forced logout takes effect on the next call without
/// rebuilding any clients. Clone is cheap and all clones share state.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    /// Current token, if any.
    pub fn get(&self) -> Option<String> {
        self.inner.read().unwrap().clone()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.inner.write().unwrap() = Some(token.into());
    }

    /// Drop the token. Called on logout and whenever the server answers 401.
    pub fn clear(&self) {
        *self.inner.write().unwrap() = None;
    }

    pub fn is_set(&self) -> bool {
        self.inner.read().unwrap().is_some()
    }
}

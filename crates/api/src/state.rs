use crate::auth::AuthTokens;
use crate::config::Config;
use store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub auth: AuthTokens,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            store: Store::new(),
            auth: config.auth.clone(),
        }
    }

    /// Open-auth state for tests and local runs.
    pub fn new_default() -> Self {
        Self {
            store: Store::new(),
            auth: AuthTokens::default(),
        }
    }
}

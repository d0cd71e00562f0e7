use std::sync::Arc;

use crate::auth::{AuthError, TokenService};
use crate::config::AppConfig;
use crate::database::Store;

/// Dependency bundle handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, AuthError> {
        let tokens = TokenService::new(&config.security)?;

        Ok(Self {
            store,
            tokens,
            config: Arc::new(config),
        })
    }
}

use std::sync::Arc;

use crate::{
    auth::{AdminAccount, TokenService},
    clock::Clock,
    db::DocumentStore,
    resources::{ResourceHandler, ResourceKind},
};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<TokenService>,
    pub admin: Arc<AdminAccount>,
    pub clock: Arc<dyn Clock>,
    /// Prefix for generated download links, without a trailing slash.
    pub download_base_url: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        jwt_secret: &str,
        admin: AdminAccount,
        clock: Arc<dyn Clock>,
        download_base_url: &str,
    ) -> Self {
        Self {
            store,
            tokens: Arc::new(TokenService::new(jwt_secret, clock.clone())),
            admin: Arc::new(admin),
            clock,
            download_base_url: Arc::from(download_base_url.trim_end_matches('/')),
        }
    }

    pub fn resource(&self, kind: &'static ResourceKind) -> ResourceHandler<'_> {
        ResourceHandler::new(kind, self.store.as_ref(), self.clock.as_ref())
    }
}

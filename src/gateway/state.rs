use std::sync::Arc;

use crate::identity::IdentityProvider;
use crate::service::RemitService;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RemitService>,
    /// Resolves bearer tokens to callers
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(service: Arc<RemitService>) -> Self {
        let identity = service.identity().clone();
        Self { service, identity }
    }
}

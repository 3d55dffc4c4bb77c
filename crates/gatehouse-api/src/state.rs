use crate::auth::{AccountRegistry, IdentityProvider};
use gatehouse_db::JobStore;
use gatehouse_infra::{SecurityHeadersConfig, TrustPolicy};
use gatehouse_storage::ObjectStore;
use std::sync::Arc;
use std::time::Duration;

/// Upload admission limits
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_bytes: u64,
    pub url_ttl: Duration,
}

/// Shared application state. Every external collaborator sits behind a capability trait.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<dyn JobStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub accounts: Arc<dyn AccountRegistry>,
    pub trust: Arc<TrustPolicy>,
    pub security_headers: Arc<SecurityHeadersConfig>,
    pub uploads: UploadConfig,
}

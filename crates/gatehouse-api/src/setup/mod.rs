//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;

use crate::auth::GoTrueIdentity;
use crate::state::{AppState, UploadConfig};
use anyhow::{Context, Result};
use gatehouse_core::Config;
use gatehouse_db::PgJobStore;
use gatehouse_infra::{SecurityHeadersConfig, TrustPolicy};
use gatehouse_storage::S3ObjectStore;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    gatehouse_infra::init_telemetry(&config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;

    let objects = S3ObjectStore::new(
        config.s3_bucket.clone(),
        config.s3_region.clone(),
        config.s3_endpoint.clone(),
    )
    .context("Failed to initialize object storage")?;

    let identity = Arc::new(
        GoTrueIdentity::new(
            config.identity_url.clone(),
            config.identity_anon_key.clone(),
            config.identity_service_role_key.clone(),
            config.session_cookie_name.clone(),
        )
        .context("Failed to initialize identity provider client")?,
    );

    let state = Arc::new(AppState {
        jobs: Arc::new(PgJobStore::new(pool)),
        objects: Arc::new(objects),
        identity: identity.clone(),
        accounts: identity,
        trust: Arc::new(TrustPolicy::from_config(&config)),
        security_headers: Arc::new(SecurityHeadersConfig::new(config.is_production())),
        uploads: UploadConfig {
            max_bytes: config.max_upload_bytes,
            url_ttl: Duration::from_secs(config.upload_url_ttl_secs),
        },
    });

    tracing::info!(
        http_concurrency_limit = config.http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );
    let router = routes::build_router(state.clone(), axum::Router::new())
        .layer(ConcurrencyLimitLayer::new(config.http_concurrency_limit));

    Ok((state, router))
}

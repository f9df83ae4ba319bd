use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::analytics::ClickRecorder;
use crate::cache::{self, AliasCache};
use crate::config::StaticConfig;
use crate::services::{AliasService, AnalyticsService};
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub cache: Arc<dyn AliasCache>,
    pub alias_service: Arc<AliasService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub recorder: Arc<ClickRecorder>,
}

/// Build everything the server needs: storage (migrated), cache, services
/// and the click recorder's worker pool.
///
/// Must run inside a tokio runtime.
pub async fn prepare_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    // A second install in the same process (tests) is harmless.
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let cache = cache::create_cache(&config.cache)
        .await
        .context("Failed to create alias cache")?;

    let alias_service = Arc::new(AliasService::from_config(
        storage.clone(),
        cache.clone(),
        config,
    ));
    let analytics_service = Arc::new(AnalyticsService::new(storage.clone()));
    let recorder = Arc::new(ClickRecorder::new(
        storage.as_click_sink(),
        &config.click_recorder,
    ));

    debug!("Pre-startup processing completed in {:?}", start_time.elapsed());

    Ok(StartupContext {
        storage,
        cache,
        alias_service,
        analytics_service,
        recorder,
    })
}

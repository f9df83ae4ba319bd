//! Server mode
//!
//! Starts the HTTP server and runs it until Ctrl+C, then stops accepting
//! requests, drains the click recorder and closes the database.

use std::time::Duration;

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::{self, middleware::RequestLogger, services::AppStartTime};
use crate::config::StaticConfig;
use crate::runtime::lifetime::{self, StartupContext};

/// Run the HTTP server
///
/// **Note**: Logging must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let StartupContext {
        storage,
        cache,
        alias_service,
        analytics_service,
        recorder,
    } = lifetime::prepare_startup(config).await.map_err(|e| {
        tracing::error!("Server startup failed: {:#}", e);
        e
    })?;

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let app_storage = storage.clone();
    let app_recorder = recorder.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(web::Data::new(alias_service.clone()))
            .app_data(web::Data::new(analytics_service.clone()))
            .app_data(web::Data::new(app_recorder.clone()))
            .app_data(web::Data::new(app_storage.clone()))
            .app_data(web::Data::new(cache.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .configure(api::configure)
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .workers(cpu_count)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    info!("Starting server at http://{}", bind_address);
    info!("Short links resolve under {}", config.server.public_base_url);

    let handle = server.handle();
    tokio::pin!(server);

    let signalled = tokio::select! {
        res = &mut server => {
            res.context("HTTP server exited with an error")?;
            false
        }
        _ = lifetime::shutdown::wait_for_signal() => true,
    };

    if signalled {
        info!("Stopping HTTP server...");
        handle.stop(true).await;
        if let Err(e) = server.await {
            warn!("HTTP server stopped with an error: {}", e);
        }
    }

    lifetime::shutdown::perform_shutdown_tasks(&recorder, &storage).await;
    warn!("Graceful shutdown: all tasks completed");
    Ok(())
}

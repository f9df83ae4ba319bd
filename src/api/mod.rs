//! HTTP surface
//!
//! Handlers expect these `web::Data` entries on the app:
//! `Arc<AliasService>`, `Arc<AnalyticsService>`, `Arc<ClickRecorder>`,
//! `Arc<SeaOrmStorage>`, `Arc<dyn AliasCache>` and `AppStartTime`.

pub mod middleware;
pub mod response;
pub mod services;

use actix_web::web;

/// Register extractor configs and every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(response::json_config())
        .app_data(response::query_config())
        .service(services::health_routes())
        .service(services::v1_routes());
}

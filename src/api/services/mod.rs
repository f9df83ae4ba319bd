pub mod analytics;
pub mod health;
pub mod redirect;
pub mod shorten;

use actix_web::web;

pub use analytics::{AnalyticsApi, AnalyticsQuery};
pub use health::{AppStartTime, HealthService};
pub use redirect::RedirectService;
pub use shorten::ShortenService;

/// Public API under `/v1`
pub fn v1_routes() -> actix_web::Scope {
    web::scope("/v1")
        .route("/shorten", web::post().to(ShortenService::create_alias))
        .route("/s/{code}", web::get().to(RedirectService::handle_redirect))
        .route("/s/{code}", web::head().to(RedirectService::handle_redirect))
        .route("/analytics/{code}", web::get().to(AnalyticsApi::get_analytics))
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
}

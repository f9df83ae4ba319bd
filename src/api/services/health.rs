use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{error, trace};

use crate::api::response::{error_response, success_response};
use crate::cache::AliasCache;
use crate::errors::LinkmeterError;
use crate::storage::SeaOrmStorage;

#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Debug)]
pub struct HealthReport {
    pub storage: String,
    pub cache: &'static str,
    pub uptime: i64,
}

pub struct HealthService;

impl HealthService {
    /// Liveness plus a bounded store ping.
    pub async fn health_check(
        storage: web::Data<Arc<SeaOrmStorage>>,
        cache: web::Data<Arc<dyn AliasCache>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> HttpResponse {
        trace!("Received health check request");

        match tokio::time::timeout(Duration::from_secs(5), storage.get_db().ping()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                return error_response(&LinkmeterError::database_connection(e.to_string()));
            }
            Err(_) => {
                return error_response(&LinkmeterError::database_connection(
                    "health check ping timed out",
                ));
            }
        }

        let uptime = (chrono::Utc::now() - app_start_time.start_datetime)
            .num_seconds()
            .max(0);

        success_response(
            StatusCode::OK,
            HealthReport {
                storage: storage.backend_name().to_string(),
                cache: cache.name(),
                uptime,
            },
        )
    }
}

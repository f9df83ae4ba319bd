//! SeaORM storage backend
//!
//! Alias store and click store on one connection pool. SQLite, MySQL/MariaDB
//! and PostgreSQL are supported; the backend is picked from the URL.

mod analytics;
mod click_sink;
mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::analytics::ClickSink;
use crate::config::DatabaseConfig;
use crate::errors::{LinkmeterError, Result};

pub use analytics::{AnalyticsField, FieldCountRow, PeriodCounts, TimeWindow, UserAgentCountRow};
pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{alias_to_active_model, model_to_alias};

/// Infer the database type from its URL
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(LinkmeterError::config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(
        database_url: &str,
        backend_name: &str,
        config: &DatabaseConfig,
    ) -> Result<Self> {
        if database_url.is_empty() {
            return Err(LinkmeterError::config("database_url is not set"));
        }

        let retry_config = retry::RetryConfig {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        };

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name, config).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        };

        run_migrations(&storage.db).await?;

        info!(
            "{} storage initialized",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub fn as_click_sink(&self) -> Arc<dyn ClickSink> {
        Arc::new(self.clone()) as Arc<dyn ClickSink>
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn close(self) {
        if let Err(e) = self.db.close().await {
            warn!("Failed to close database connection: {}", e);
        }
    }
}

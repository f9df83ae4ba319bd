//! Service layer for business logic
//!
//! HTTP handlers stay thin and delegate here; services own validation,
//! cache-aside resolution and analytics shaping.

mod alias_service;
mod analytics_service;

pub use alias_service::*;
pub use analytics_service::*;

//! linkmeter - URL shortener with click analytics
//!
//! Short codes map to target URLs. Resolution reads a cache first and falls
//! back to the alias store; each successful redirect hands a click to a
//! bounded background recorder; analytics aggregate the click log per code
//! over calendar and rolling windows.
//!
//! # Architecture
//! - `cache`: alias cache (Redis, in-process moka, or none)
//! - `storage`: SeaORM alias and click stores
//! - `analytics`: click capture, user agent parsing and the click recorder
//! - `services`: alias creation/resolution and analytics aggregation
//! - `api`: HTTP handlers, response envelope and middleware
//! - `config`: TOML + environment configuration
//! - `runtime`: startup wiring, server mode and shutdown
//! - `system`: logging setup

pub mod analytics;
pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;

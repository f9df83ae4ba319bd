//! Application lifecycle
//!
//! - `lifetime`: startup wiring and shutdown draining
//! - `modes`: execution modes (currently the HTTP server only)

pub mod lifetime;
pub mod modes;

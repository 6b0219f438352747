//! API Module
//!
//! HTTP handlers and routing for the operational endpoints.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Cache and lock statistics

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

//! HTTP transport: axum routes and server lifecycle.

mod openapi;
mod routes;
mod server;

pub use openapi::openapi_document;
pub use routes::{HealthCheckResponse, routes};
pub use server::{ServerConfig, serve};

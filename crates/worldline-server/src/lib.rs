//! # worldline-server
//!
//! Axum HTTP API for the worldline scenario service.
//!
//! - Bearer-token authentication resolving to a store user
//! - Event CRUD under `/events`, scoped to the authenticated caller
//! - Nested object reconciliation on create and update
//! - Uniform error envelope (`{"error": {"code", "message", "field"?}}`)
//! - Health check, request tracing, permissive CORS

#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod server;

pub use config::ServerConfig;
pub use errors::ApiError;
pub use server::{AppState, WorldlineServer};

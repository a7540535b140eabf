//! DripRust API - REST API server
//!
//! This crate provides the REST API for DripRust: campaign creation
//! and listing, lifecycle actions, message inspection, and batch
//! sending.

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

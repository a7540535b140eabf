//! DripRust Storage - SQLite persistence layer
//!
//! Campaigns and their scheduled messages are stored in SQLite through
//! sqlx. Repositories expose typed queries over the shared pool.

pub mod db;
pub mod models;
pub mod repository;

pub use db::DatabasePool;
pub use models::*;
pub use repository::*;

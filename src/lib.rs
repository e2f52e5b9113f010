//! BookHeaven Library Management System
//!
//! A REST JSON API server for managing a library catalog (books, authors,
//! categories), member profiles and the borrow/return workflow.

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod permissions;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: Pool<Postgres>,
    pub services: Arc<services::Services>,
}

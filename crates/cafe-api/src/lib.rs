//! Cafe website REST API server library

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod auth;
pub mod cache;
pub mod forms;
pub mod handlers;
pub mod images;
pub mod middleware;
pub mod routes;
pub mod state;

pub use state::AppState;

use axum::Router;
use cafe_core::{Config, context_error::Result};
use cafe_database::PgPool;
use std::sync::Arc;

/// Build the API router with all routes and middleware
///
/// # Errors
///
/// Returns an error if the application state cannot be created or fails validation.
pub fn build_router(config: Config, pool: PgPool) -> Result<Router> {
    let state = Arc::new(AppState::new(config, pool)?);
    state.validate()?;
    Ok(routes::build_router(state))
}

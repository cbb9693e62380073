//! Client for the cafe website API
//!
//! Public menu and news views, the admin session gate, and the admin
//! workflows for menu items, news and categories.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod admin;
pub mod api;
pub mod api_client;
pub mod auth;
pub mod error;
pub mod forms;
pub mod images;
pub mod notifications;
pub mod storage;
pub mod views;

#[cfg(test)]
mod testing;

pub use api::CafeApi;
pub use api_client::ApiClient;
pub use auth::AuthGate;
pub use error::{ClientError, Result};
pub use notifications::{Notification, NotificationKind, NotificationQueue};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SnapshotCache};
pub use views::PublicSite;

//! Notekeep - A personal note-taking service
//!
//! Notes, labels, and sharing behind a cache-aside read layer and a
//! durable email-notification queue with at-least-once delivery.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod notes;
pub mod queue;
pub mod store;
pub mod worker;

pub use api::AppState;
pub use config::Config;
pub use worker::spawn_email_worker;

//! Configuration Module
//!
//! Handles loading and managing service configuration from environment
//! variables.

use std::env;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache store / broker URL
    pub redis_url: String,
    /// Whether the external cache is consulted at all
    pub cache_enabled: bool,
    /// Cache entry TTL in seconds; bounds staleness after a missed
    /// invalidation, not a freshness requirement in itself
    pub cache_ttl: u64,
    /// Uniform page-size cap for every list read
    pub page_size: usize,
    /// Name of the durable email-task queue
    pub email_queue: String,
    /// Mail provider API endpoint
    pub mail_endpoint: String,
    /// Optional bearer token for the mail provider
    pub mail_api_key: Option<String>,
    /// Sender address on invitation emails
    pub mail_from: String,
    /// Base URL used in invitation links
    pub app_url: String,
    /// Delivery attempts before a task is dead-lettered
    pub worker_max_attempts: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `REDIS_URL` - cache/broker URL (default: redis://127.0.0.1:6379)
    /// - `CACHE_ENABLED` - set to "false" to run without the cache
    /// - `CACHE_TTL` - cache entry TTL in seconds (default: 3600)
    /// - `PAGE_SIZE` - list read cap (default: 100)
    /// - `EMAIL_QUEUE` - email queue name (default: notekeep_email_queue)
    /// - `MAIL_ENDPOINT` - mail provider API URL
    /// - `MAIL_API_KEY` - mail provider bearer token (optional)
    /// - `MAIL_FROM` - sender address (default: noreply@notekeep.dev)
    /// - `APP_URL` - base URL for links in emails (default: http://localhost:3000)
    /// - `WORKER_MAX_ATTEMPTS` - delivery attempt cap (default: 5)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            cache_enabled: env::var("CACHE_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            cache_ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            email_queue: env::var("EMAIL_QUEUE")
                .unwrap_or_else(|_| "notekeep_email_queue".to_string()),
            mail_endpoint: env::var("MAIL_ENDPOINT")
                .unwrap_or_else(|_| "http://127.0.0.1:8025/api/send".to_string()),
            mail_api_key: env::var("MAIL_API_KEY").ok(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "noreply@notekeep.dev".to_string()),
            app_url: env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            worker_max_attempts: env::var("WORKER_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            cache_enabled: true,
            cache_ttl: 3600,
            page_size: 100,
            email_queue: "notekeep_email_queue".to_string(),
            mail_endpoint: "http://127.0.0.1:8025/api/send".to_string(),
            mail_api_key: None,
            mail_from: "noreply@notekeep.dev".to_string(),
            app_url: "http://localhost:3000".to_string(),
            worker_max_attempts: 5,
        }
    }
}

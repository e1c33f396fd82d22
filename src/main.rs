//! Notekeep - A personal note-taking service
//!
//! Process entry point: owns client construction and lifecycle (cache
//! backend, broker, mail transport), wires the services, starts the email
//! worker once, and serves the HTTP API until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notekeep::api::{create_router, AppState};
use notekeep::cache::{CacheBackend, CacheManager, NoopCacheBackend, RedisCacheBackend};
use notekeep::config::Config;
use notekeep::mail::HttpMailer;
use notekeep::notes::{LabelService, NoteService};
use notekeep::queue::{NotificationPublisher, RedisQueue};
use notekeep::store::{MemoryLabelStore, MemoryNoteStore, MemoryUserDirectory};
use notekeep::worker::{spawn_email_worker, EmailWorker};

/// Main entry point for the Notekeep service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the cache backend (degrading to no-cache on failure)
/// 4. Connect the durable email queue
/// 5. Wire stores, cache manager, publisher, and services
/// 6. Start the email worker
/// 7. Start the HTTP server and handle graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notekeep=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Notekeep");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cache_enabled={}, cache_ttl={}s, page_size={}, queue={}",
        config.server_port,
        config.cache_enabled,
        config.cache_ttl,
        config.page_size,
        config.email_queue
    );

    // Cache backend: outages degrade reads to storage, so a missing cache
    // store at boot downgrades to the noop backend instead of failing.
    let cache_backend: Arc<dyn CacheBackend> = if config.cache_enabled {
        match RedisCacheBackend::connect(&config.redis_url).await {
            Ok(backend) => {
                info!("Cache backend connected");
                Arc::new(backend)
            }
            Err(err) => {
                warn!(error = %err, "cache backend unreachable, running uncached");
                Arc::new(NoopCacheBackend::new())
            }
        }
    } else {
        info!("Cache disabled by configuration");
        Arc::new(NoopCacheBackend::new())
    };
    let cache = CacheManager::new(cache_backend, config.cache_ttl);

    // The broker is not optional: without it, invitation publishes could
    // only be dropped, which the publish contract forbids.
    let queue = Arc::new(
        RedisQueue::connect(&config.redis_url, &config.email_queue)
            .await
            .context("email queue broker unreachable")?,
    );
    info!("Email queue connected: {}", config.email_queue);

    let notes = Arc::new(MemoryNoteStore::new());
    let labels = Arc::new(MemoryLabelStore::new());
    let users = Arc::new(MemoryUserDirectory::new());

    let publisher = NotificationPublisher::new(queue.clone());
    let note_service = NoteService::new(
        notes.clone(),
        labels.clone(),
        users.clone(),
        cache.clone(),
        publisher,
        config.page_size,
    );
    let label_service = LabelService::new(labels, notes, cache);

    // One consumer started at boot; additional instances of this process
    // can safely consume the same queue.
    let mailer = Arc::new(HttpMailer::new(
        &config.mail_endpoint,
        config.mail_api_key.clone(),
    ));
    let worker = EmailWorker::new(
        queue,
        mailer,
        &config.mail_from,
        &config.app_url,
        config.worker_max_attempts,
    );
    let worker_handle = spawn_email_worker(worker);
    info!("Email worker started");

    let state = AppState::new(note_service, label_service, users);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(worker_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the email worker and allows graceful
/// shutdown. An aborted worker leaves at most one claimed delivery
/// pending; the next worker start requeues it.
async fn shutdown_signal(worker_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    worker_handle.abort();
    warn!("Email worker stopped");
}

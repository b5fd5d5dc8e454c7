//! Server startup: shared handles, router, graceful shutdown.

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use tracing::info;

use receiver_core::Config;
use receiver_queue::{Transport, ZmqDispatcher};
use receiver_storage::{connect_pool, run_migrations, PgImageStore};

use crate::ingest::IngestService;
use crate::router::build_router;
use crate::state::AppState;

/// Build `AppState` from config, returning the pool so it can be closed on shutdown.
pub async fn build_app_state(config: &Config, migrate: bool) -> anyhow::Result<(Arc<AppState>, PgPool)> {
    let pool = connect_pool(&config.postgres)
        .await
        .context("failed to initialize PostgreSQL pool")?;

    if migrate {
        run_migrations(&pool).await.context("failed to run migrations")?;
    }

    let transport = Transport::tcp(config.queue.host.clone(), config.queue.port);
    let dispatcher = ZmqDispatcher::connect(
        &transport,
        config.queue.topic.clone(),
        config.queue.send_timeout(),
        config.queue.connect_timeout(),
    )
    .await
        .with_context(|| format!("failed to connect to queue at {transport}"))?;
    info!(endpoint = %transport, topic = %config.queue.topic, "queue dispatcher ready");

    let store = Arc::new(PgImageStore::new(pool.clone()));
    let ingest = IngestService::new(store.clone(), Arc::new(dispatcher), config.server.request_timeout());
    let state = Arc::new(AppState::new(ingest, store, config.server.request_timeout()));

    Ok((state, pool))
}

/// Apply migrations and exit.
pub async fn migrate(config: &Config) -> anyhow::Result<()> {
    let pool = connect_pool(&config.postgres)
        .await
        .context("failed to initialize PostgreSQL pool")?;
    run_migrations(&pool).await.context("failed to run migrations")?;
    pool.close().await;
    Ok(())
}

/// Run the HTTP server until Ctrl-C, then drain requests and close the pool.
pub async fn serve(config: &Config, migrate: bool) -> anyhow::Result<()> {
    let (state, pool) = build_app_state(config, migrate).await?;
    let app = build_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing database pool");
    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl_c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

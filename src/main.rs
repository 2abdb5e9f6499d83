use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use liftchat::clock::{Clock, SystemClock};
use liftchat::config::Config;
use liftchat::conversation::ConversationEngine;
use liftchat::handlers::events;
use liftchat::repositories::WorkoutRepository;
use liftchat::session::SessionStore;
use liftchat::{db, migrations, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "liftchat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database: {}", config.database_url);

    let pool = db::create_pool(&config.database_url)?;
    migrations::run_migrations(&pool)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sessions = SessionStore::new(
        chrono::Duration::minutes(config.session_ttl_minutes),
        clock.clone(),
    );
    let engine = Arc::new(ConversationEngine::new(
        WorkoutRepository::new(pool.clone()),
        sessions,
        clock,
        config.commit_mode,
    ));
    tracing::info!(
        "Sessions expire after {} idle minutes, commit mode {:?}",
        config.session_ttl_minutes,
        engine.commit_mode()
    );

    spawn_session_sweeper(engine.clone(), config.session_sweep_seconds);

    let app = routes::create_router(events::EventsState { engine });

    let addr = config.server_addr();
    tracing::info!("Listening for chat events at http://{}/events", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Periodically drop conversations nobody has touched within the TTL.
fn spawn_session_sweeper(engine: Arc<ConversationEngine>, every_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(every_seconds.max(1)));
        loop {
            interval.tick().await;
            let evicted = engine.sessions().cleanup_expired();
            if evicted > 0 {
                tracing::info!("Evicted {} idle conversations", evicted);
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

use linklet_ai::HttpChatBackend;
use linklet_conversation::SessionStore;
use linklet_engine::{EngineConfig, HttpEngineClient};
use linklet_platform_access::RateLimiter;
use linklet_server::config::ServerConfig;
use linklet_server::db::{PgUserDirectory, PgWorkflowRepository};
use linklet_server::routes;
use linklet_server::state::AppState;
use linklet_workflow::WorkflowOrchestrator;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("failed to run migrations");

    // Construct the remote engine client
    let engine_config = EngineConfig::new(&config.engine.base_url, &config.engine.api_key)
        .with_timeout_seconds(config.engine.timeout_seconds);
    let engine = HttpEngineClient::new(engine_config).expect("failed to build engine client");

    // Select the chat provider once at startup
    let chat_config = config.ai.backend_config().expect("invalid AI configuration");
    tracing::info!(provider = %chat_config.provider, model = %chat_config.model, "Chat backend selected");
    let chat = Arc::new(HttpChatBackend::new(chat_config).expect("failed to build chat backend"));

    // Wire services
    let repository = PgWorkflowRepository::new(db_pool.clone());
    let users = PgUserDirectory::new(db_pool);
    let orchestrator =
        WorkflowOrchestrator::new(repository, engine, config.engine.webhook_base_url.clone());
    let sessions = SessionStore::new(chrono::Duration::minutes(config.session.ttl_minutes));
    let limiter = RateLimiter::new(config.rate_limit.to_config());

    let state = Arc::new(AppState::new(orchestrator, sessions, users, limiter, chat));

    // Spawn periodic sweep of abandoned conversations
    let sweep_state = state.clone();
    let cleanup_interval_secs = config.session.cleanup_interval_seconds;
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(cleanup_interval_secs));
        loop {
            interval.tick().await;
            let dropped = sweep_state.sessions.sweep_expired();
            if dropped > 0 {
                tracing::debug!(dropped, "Discarded abandoned conversations");
            }
        }
    });

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}

use cadence_api::{
    auth::{AuthService, MemorySessionStore, SessionStore},
    db::{Datastore, MemoryStore},
    utils::Config,
    AppState,
};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_api=debug,tower_http=debug".into()),
        )
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    info!("Starting Cadence API server with config: {:?}", config);

    // Wire up the stores and the auth service
    let store: Arc<dyn Datastore> = Arc::new(MemoryStore::new());
    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(
        chrono::Duration::days(config.session.ttl_days),
    ));
    let auth = Arc::new(AuthService::new(store.clone(), sessions.clone()));

    let state = AppState {
        store,
        sessions,
        auth,
        config: config.clone(),
    };
    let app = cadence_api::app(state);

    // Create server address
    let addr = config.server.socket_addr()?;
    info!("Server listening on {}", addr);

    // Run the server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}

use axum::{Router, routing::get};
use datasource::FixtureRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
// Note: Tracing is initialized by the calling binary.

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub repo: FixtureRepository,
}

/// Builds the API router. Separate from `run_server` so tests can drive it
/// without binding a socket.
pub fn router(repo: FixtureRepository) -> Router {
    let app_state = Arc::new(AppState { repo });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/customer", get(handlers::get_customer))
        .route("/api/team", get(handlers::get_team))
        .route("/api/account_industry", get(handlers::get_account_industry))
        .route("/api/charts/:chart_type", get(handlers::get_chart))
        .route("/api/datasets", get(handlers::get_datasets))
        .route("/api/format", get(handlers::format_value))
        .with_state(app_state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Serves the API on `addr` until Ctrl-C.
pub async fn run_server(addr: SocketAddr, repo: FixtureRepository) -> anyhow::Result<()> {
    let app = router(repo);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received.");
}

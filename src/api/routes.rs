//! Router assembly and server lifecycle.

use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, Json},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::SqliteTaskStore;
use crate::task::TaskService;

use super::tasks as tasks_api;
use super::types::HealthResponse;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub service: Arc<TaskService>,
}

impl AppState {
    pub fn new(config: Config, service: Arc<TaskService>) -> Self {
        Self { config, service }
    }
}

/// Build the application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .nest("/api/tasks", tasks_api::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = SqliteTaskStore::new(&config.database_path).await?;
    tracing::info!("Task database at {}", store.path().display());

    let service = Arc::new(TaskService::new(Arc::new(store)));
    let state = Arc::new(AppState::new(config.clone(), service));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

/// GET / - htmx front page.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = if state.service.store().is_persistent() {
        "ok"
    } else {
        "ok (in-memory)"
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

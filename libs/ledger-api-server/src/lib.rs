mod http;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio_util::sync::CancellationToken;

use ledger_engine::QueryService;

#[derive(Clone)]
struct AppState {
    service: Arc<QueryService>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("bind api :{port}: {source}")]
    Bind { port: u16, source: std::io::Error },

    #[error("axum serve: {0}")]
    Serve(std::io::Error),
}

/// Front end с формами поверх query service: store, inquiry, delete.
pub fn router(service: Arc<QueryService>) -> Router {
    Router::new()
        .route("/", get(http::handle_index))
        .route("/store", post(http::handle_store))
        .route("/inquiry", get(http::handle_inquiry))
        .route("/delete", post(http::handle_delete))
        .with_state(AppState { service })
}

/// Обслуживать [`router`] на `0.0.0.0:port`, пока не отменён `shutdown`.
/// Запросы в обработке завершаются до возврата.
pub async fn run(
    port: u16,
    service: Arc<QueryService>,
    shutdown: CancellationToken,
) -> Result<(), ServeError> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|source| ServeError::Bind { port, source })?;
    tracing::info!(port, "web front end listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(ServeError::Serve)?;

    Ok(())
}

pub mod delete;
pub mod publish;
pub mod serve;
pub mod subscribe;
pub mod view;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use ledger_store::{MongoStore, StoreGateway};

use crate::config::AppConfig;
use crate::error::ServerError;

/// Собрать gateway к MongoDB с `timeout` на вызов и проверить, что сервер отвечает.
pub(crate) async fn connect_store(
    config: &AppConfig,
    timeout: Duration,
) -> Result<StoreGateway, ServerError> {
    let store = MongoStore::connect(&config.mongo).await?;
    let gateway = StoreGateway::new(Arc::new(store), timeout);
    gateway.ping().await?;
    tracing::info!(
        database = %config.mongo.database,
        collection = %config.mongo.collection,
        "connected to mongodb"
    );
    Ok(gateway)
}

/// Отменить `token` по Ctrl+C или SIGTERM.
pub(crate) fn cancel_on_signal(token: CancellationToken) {
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => {
                tracing::info!("shutdown signal received");
                token.cancel();
            }
            Err(e) => tracing::error!(error = %e, "cannot listen for shutdown signal"),
        }
    });
}

async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        signal(SignalKind::terminate())?.recv().await;
        Ok::<(), std::io::Error>(())
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<std::io::Result<()>>();

    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        res = terminate => res,
    }
}

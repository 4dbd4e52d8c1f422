use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use ledger_engine::QueryService;

use crate::config::{AppConfig, ServeArgs};
use crate::error::ServerError;

pub async fn run(config: &AppConfig, args: ServeArgs) -> Result<(), ServerError> {
    tracing::info!("ledger web front end starting");

    let gateway = super::connect_store(config, config.query.timeout()).await?;
    gateway.init().await?;
    let service = Arc::new(QueryService::new(gateway));

    let token = CancellationToken::new();
    super::cancel_on_signal(token.clone());

    let port = args.port.unwrap_or(config.web.port);
    ledger_api_server::run(port, service, token).await?;

    tracing::info!("server exited gracefully");
    Ok(())
}

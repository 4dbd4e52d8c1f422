use std::time::Duration;

use tokio::io::BufReader;

use ledger_api::MessageBus;
use ledger_bus::{NatsBus, publish_lines};

use crate::config::{AppConfig, PublishArgs};
use crate::error::ServerError;

const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn run(config: &AppConfig, args: PublishArgs) -> Result<(), ServerError> {
    let file = tokio::fs::File::open(&args.file)
        .await
        .map_err(|e| ServerError::Config {
            context: "publish file",
            detail: format!("{}: {e}", args.file),
        })?;
    let bus = NatsBus::connect(&config.nats.url).await?;

    let report = publish_lines(
        &bus,
        &config.nats.subject,
        BufReader::new(file),
        Duration::from_millis(args.interval_ms),
    )
    .await?;

    match tokio::time::timeout(FLUSH_TIMEOUT, bus.flush()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "flush failed"),
        Err(_) => tracing::warn!(timeout = ?FLUSH_TIMEOUT, "flush timed out"),
    }

    tracing::info!(
        subject = %config.nats.subject,
        published = report.published,
        failed = report.failed,
        skipped_empty = report.skipped_empty,
        "publisher finished"
    );
    Ok(())
}

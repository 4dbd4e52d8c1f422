use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use ledger_bus::NatsBus;
use ledger_engine::{FilterPolicy, Ingestor, start_subscriber};

use crate::config::{AppConfig, SubscribeArgs};
use crate::error::ServerError;

pub async fn run(config: &AppConfig, args: SubscribeArgs) -> Result<(), ServerError> {
    tracing::info!("ledger subscriber starting");

    let bus = NatsBus::connect(&config.nats.url).await?;
    let gateway = super::connect_store(config, config.ingest.insert_timeout()).await?;
    gateway.init().await?;

    let policy = FilterPolicy::new(config.ingest.blocked_ledger_code);
    let ingestor = Arc::new(Ingestor::new(policy, gateway));
    let idle_timeout = args
        .idle_timeout
        .map(Duration::from_secs)
        .or(config.ingest.idle_timeout());

    let token = CancellationToken::new();
    super::cancel_on_signal(token.clone());

    let handle = start_subscriber(&bus, &config.nats.subject, ingestor, idle_timeout, token).await?;
    tracing::info!(
        subject = %config.nats.subject,
        blocked_ledger_code = policy.blocked_ledger_code(),
        idle_timeout = ?idle_timeout,
        "listening for messages"
    );

    let report = handle.join().await?;
    tracing::info!(
        stop = ?report.stop,
        stored = report.stats.stored,
        received = report.stats.received,
        "subscriber exited"
    );
    Ok(())
}

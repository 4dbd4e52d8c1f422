use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use ledger_api::{BusError, BusMessage, BusSubscription, MessageBus};

use crate::ingest::{IngestStats, Ingestor, Outcome};

/// Жизненный цикл подписчика. Переходы только вперёд, кроме
/// `Listening` и `Processing`, которые чередуются на каждом сообщении.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    Idle,
    Connected,
    Listening,
    Processing,
    Closed,
}

/// Почему цикл завершился.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    IdleTimeout,
    /// Bus закрыл подписку (сервер пропал, bus остановлен).
    SubscriptionClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberReport {
    pub stats: IngestStats,
    pub stop: StopReason,
}

pub struct SubscriberHandle {
    join: JoinHandle<SubscriberReport>,
    state: watch::Receiver<SubscriberState>,
}

impl SubscriberHandle {
    pub fn state(&self) -> SubscriberState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SubscriberState> {
        self.state.clone()
    }

    pub async fn join(self) -> Result<SubscriberReport, JoinError> {
        self.join.await
    }
}

/// Подписаться на `subject` и запустить цикл ingestion.
///
/// Подписка открывается до возврата, поэтому сбой bus приходит ошибкой,
/// а не мёртвой задачей. Дальше цикл обрабатывает сообщения по одному в
/// порядке доставки, пока не отменён `token`, не закрыта подписка или не
/// истёк `idle_timeout` без сообщений. Сообщение, которое уже в обработке
/// в момент отмены, дообрабатывается.
pub async fn start_subscriber(
    bus: &dyn MessageBus,
    subject: &str,
    ingestor: Arc<Ingestor>,
    idle_timeout: Option<Duration>,
    token: CancellationToken,
) -> Result<SubscriberHandle, BusError> {
    let (state_tx, state_rx) = watch::channel(SubscriberState::Idle);

    let subscription = bus.subscribe(subject).await?;
    state_tx.send_replace(SubscriberState::Connected);
    tracing::info!(subject = %subject, "subscribed");

    let join = tokio::spawn(run_loop(subscription, ingestor, idle_timeout, token, state_tx));
    Ok(SubscriberHandle {
        join,
        state: state_rx,
    })
}

async fn run_loop(
    mut subscription: Box<dyn BusSubscription>,
    ingestor: Arc<Ingestor>,
    idle_timeout: Option<Duration>,
    token: CancellationToken,
    state: watch::Sender<SubscriberState>,
) -> SubscriberReport {
    let subject = subscription.subject().to_string();
    let mut stats = IngestStats::default();
    state.send_replace(SubscriberState::Listening);

    let stop = loop {
        // Новый таймер на каждой итерации: окно простоя сбрасывается после сообщения.
        let idle = async {
            match idle_timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };

        let message = tokio::select! {
            biased;
            _ = token.cancelled() => break StopReason::Cancelled,
            _ = idle => break StopReason::IdleTimeout,
            message = subscription.recv() => message,
        };
        let Some(message) = message else {
            break StopReason::SubscriptionClosed;
        };

        state.send_replace(SubscriberState::Processing);
        tracing::debug!(subject = %subject, bytes = message.payload.len(), "message received");
        let outcome = ingestor.process(&message.payload).await;
        log_outcome(&subject, &message, &outcome);
        stats.record(&outcome);
        state.send_replace(SubscriberState::Listening);
    };

    if stop != StopReason::SubscriptionClosed {
        if let Err(e) = subscription.unsubscribe().await {
            tracing::warn!(subject = %subject, error = %e, "unsubscribe failed");
        }
    }
    state.send_replace(SubscriberState::Closed);

    tracing::info!(
        subject = %subject,
        stop = ?stop,
        received = stats.received,
        stored = stats.stored,
        rejected = stats.rejected,
        filtered = stats.filtered,
        failed = stats.failed,
        "subscriber stopped"
    );
    SubscriberReport { stats, stop }
}

fn log_outcome(subject: &str, message: &BusMessage, outcome: &Outcome) {
    match outcome {
        Outcome::Stored(id) => {
            tracing::debug!(subject = %subject, id = %id, "message stored");
        }
        Outcome::Rejected(rejection) => {
            tracing::warn!(
                subject = %subject,
                reason = rejection.reason(),
                error = %rejection,
                payload = %String::from_utf8_lossy(&message.payload),
                "invalid message, skipping"
            );
        }
        Outcome::Filtered(code) => {
            tracing::info!(subject = %subject, ledger_code = code, "message filtered out");
        }
        Outcome::StoreFailed(e) => {
            tracing::error!(
                subject = %subject,
                kind = %e.kind(),
                error = %e,
                "insert failed, message dropped"
            );
        }
    }
}

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use ledger_api::MessageBus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub published: u64,
    pub failed: u64,
    pub skipped_empty: u64,
}

/// Опубликовать каждую непустую строку `reader` в `subject` в порядке файла.
///
/// Неудачный publish логируется и считается, остальное всё равно
/// отправляется. После каждой строки пауза `interval`. Flush на вызывающем.
pub async fn publish_lines<R>(
    bus: &dyn MessageBus,
    subject: &str,
    reader: R,
    interval: Duration,
) -> std::io::Result<PublishReport>
where
    R: AsyncBufRead + Unpin,
{
    let mut report = PublishReport::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            report.skipped_empty += 1;
            continue;
        }
        match bus.publish(subject, line.clone().into_bytes()).await {
            Ok(()) => {
                report.published += 1;
                tracing::debug!(subject = %subject, line = %line, "published");
            }
            Err(e) => {
                report.failed += 1;
                tracing::error!(subject = %subject, error = %e, "publish failed");
            }
        }
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }
    Ok(report)
}

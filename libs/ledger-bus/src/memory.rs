use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::{RwLock, mpsc};

use ledger_api::{BusError, BusMessage, BusSubscription, MessageBus};

/// Что делает publish, когда очередь подписчика полна.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Отбросить сообщение для этого подписчика и залогировать.
    Drop,
    /// Ждать, пока подписчик освободит место. Доставка без потерь.
    #[default]
    BackPressure,
}

struct Subscriber {
    tx: mpsc::Sender<BusMessage>,
}

// ═══════════════════════════════════════════════════════════════
//  MemorySubscription
// ═══════════════════════════════════════════════════════════════

pub struct MemorySubscription {
    subject: String,
    rx: mpsc::Receiver<BusMessage>,
}

impl BusSubscription for MemorySubscription {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn recv(&mut self) -> Pin<Box<dyn Future<Output = Option<BusMessage>> + Send + '_>> {
        Box::pin(async move { self.rx.recv().await })
    }

    fn unsubscribe(&mut self) -> Pin<Box<dyn Future<Output = Result<(), BusError>> + Send + '_>> {
        Box::pin(async move {
            self.rx.close();
            while self.rx.try_recv().is_ok() {}
            Ok(())
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryBus
// ═══════════════════════════════════════════════════════════════

/// In-process bus: subject по точному совпадению, у каждого подписчика своя очередь.
///
/// Publish доставляет сообщение всем живым подписчикам subject до возврата,
/// поэтому у одного publisher порядок строгий. Таблица subject'ов под
/// блокировкой только пока копируется список подписчиков.
pub struct MemoryBus {
    subjects: RwLock<HashMap<String, Vec<Subscriber>>>,
    buffer: usize,
    overflow: OverflowPolicy,
}

impl MemoryBus {
    pub fn new(buffer: usize, overflow: OverflowPolicy) -> Self {
        Self {
            subjects: RwLock::new(HashMap::new()),
            buffer: buffer.max(1),
            overflow,
        }
    }

    /// Отцепить всех подписчиков `subject`. Их очереди дочитываются и затем
    /// закрываются, как при разрыве со стороны сервера.
    pub async fn close(&self, subject: &str) {
        self.subjects.write().await.remove(subject);
    }

    pub async fn subscriber_count(&self, subject: &str) -> usize {
        self.subjects
            .read()
            .await
            .get(subject)
            .map_or(0, |subs| subs.iter().filter(|s| !s.tx.is_closed()).count())
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new(1024, OverflowPolicy::default())
    }
}

impl MessageBus for MemoryBus {
    fn subscribe(
        &self,
        subject: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn BusSubscription>, BusError>> + Send + '_>> {
        let subject = subject.to_string();
        Box::pin(async move {
            let (tx, rx) = mpsc::channel(self.buffer);
            self.subjects
                .write()
                .await
                .entry(subject.clone())
                .or_default()
                .push(Subscriber { tx });
            Ok(Box::new(MemorySubscription { subject, rx }) as Box<dyn BusSubscription>)
        })
    }

    fn publish(
        &self,
        subject: &str,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<(), BusError>> + Send + '_>> {
        let subject = subject.to_string();
        Box::pin(async move {
            // Отправка вне блокировки: полная очередь тормозит только этот publish.
            let targets: Vec<mpsc::Sender<BusMessage>> = {
                let mut subjects = self.subjects.write().await;
                let Some(subs) = subjects.get_mut(&subject) else {
                    tracing::trace!(subject = %subject, "no subscribers");
                    return Ok(());
                };
                subs.retain(|s| !s.tx.is_closed());
                subs.iter().map(|s| s.tx.clone()).collect()
            };

            let message = BusMessage {
                subject: subject.clone(),
                payload,
            };
            for tx in &targets {
                match self.overflow {
                    OverflowPolicy::Drop => {
                        if let Err(mpsc::error::TrySendError::Full(_)) =
                            tx.try_send(message.clone())
                        {
                            tracing::warn!(subject = %subject, "subscriber queue full, dropping");
                        }
                    }
                    // Ушедший получатель вычищается при следующем publish.
                    OverflowPolicy::BackPressure => {
                        let _ = tx.send(message.clone()).await;
                    }
                }
            }
            Ok(())
        })
    }

    fn flush(&self) -> Pin<Box<dyn Future<Output = Result<(), BusError>> + Send + '_>> {
        Box::pin(async { Ok(()) })
    }
}

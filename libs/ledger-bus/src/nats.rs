use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;

use ledger_api::{BusError, BusMessage, BusSubscription, MessageBus};

fn default_url() -> String {
    "nats://127.0.0.1:4222".to_string()
}

fn default_subject() -> String {
    "updates".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            subject: default_subject(),
        }
    }
}

/// Core NATS (без JetStream): at-most-once, порядок в пределах подписки.
pub struct NatsBus {
    client: async_nats::Client,
}

impl NatsBus {
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        let client = async_nats::connect(url).await.map_err(|e| BusError::Connect {
            url: url.to_string(),
            detail: e.to_string(),
        })?;
        tracing::info!(url = %url, "connected to nats");
        Ok(Self { client })
    }
}

pub struct NatsSubscription {
    subject: String,
    inner: async_nats::Subscriber,
}

impl BusSubscription for NatsSubscription {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn recv(&mut self) -> Pin<Box<dyn Future<Output = Option<BusMessage>> + Send + '_>> {
        Box::pin(async move {
            let message = self.inner.next().await?;
            Some(BusMessage {
                subject: message.subject.to_string(),
                payload: message.payload.to_vec(),
            })
        })
    }

    fn unsubscribe(&mut self) -> Pin<Box<dyn Future<Output = Result<(), BusError>> + Send + '_>> {
        Box::pin(async move {
            self.inner
                .unsubscribe()
                .await
                .map_err(|e| BusError::Unsubscribe {
                    subject: self.subject.clone(),
                    detail: e.to_string(),
                })
        })
    }
}

impl MessageBus for NatsBus {
    fn subscribe(
        &self,
        subject: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn BusSubscription>, BusError>> + Send + '_>> {
        let subject = subject.to_string();
        Box::pin(async move {
            let inner = self
                .client
                .subscribe(subject.clone())
                .await
                .map_err(|e| BusError::Subscribe {
                    subject: subject.clone(),
                    detail: e.to_string(),
                })?;
            tracing::debug!(subject = %subject, "nats subscription opened");
            Ok(Box::new(NatsSubscription { subject, inner }) as Box<dyn BusSubscription>)
        })
    }

    fn publish(
        &self,
        subject: &str,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<(), BusError>> + Send + '_>> {
        let subject = subject.to_string();
        Box::pin(async move {
            self.client
                .publish(subject.clone(), Bytes::from(payload))
                .await
                .map_err(|e| BusError::Publish {
                    subject,
                    detail: e.to_string(),
                })
        })
    }

    fn flush(&self) -> Pin<Box<dyn Future<Output = Result<(), BusError>> + Send + '_>> {
        Box::pin(async move {
            self.client
                .flush()
                .await
                .map_err(|e| BusError::Flush(e.to_string()))
        })
    }
}

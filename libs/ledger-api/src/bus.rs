use std::future::Future;
use std::pin::Pin;

/// Одно сообщение в том виде, как его доставил bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub subject: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("connect ({url}): {detail}")]
    Connect { url: String, detail: String },

    #[error("subscribe ({subject}): {detail}")]
    Subscribe { subject: String, detail: String },

    #[error("unsubscribe ({subject}): {detail}")]
    Unsubscribe { subject: String, detail: String },

    #[error("publish ({subject}): {detail}")]
    Publish { subject: String, detail: String },

    #[error("flush: {0}")]
    Flush(String),
}

/// Активная подписка на один subject. Сообщения приходят в порядке доставки.
pub trait BusSubscription: Send {
    fn subject(&self) -> &str;

    /// Следующее сообщение. `None`, когда подписка закрыта и вычитана.
    fn recv(&mut self) -> Pin<Box<dyn Future<Output = Option<BusMessage>> + Send + '_>>;

    /// Остановить доставку. Непрочитанные сообщения из буфера отбрасываются.
    fn unsubscribe(&mut self) -> Pin<Box<dyn Future<Output = Result<(), BusError>> + Send + '_>>;
}

/// Pub/sub транспорт с адресацией по subject.
pub trait MessageBus: Send + Sync {
    fn subscribe(
        &self,
        subject: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn BusSubscription>, BusError>> + Send + '_>>;

    fn publish(
        &self,
        subject: &str,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<(), BusError>> + Send + '_>>;

    /// Дождаться, пока всё опубликованное уйдёт из клиента.
    fn flush(&self) -> Pin<Box<dyn Future<Output = Result<(), BusError>> + Send + '_>>;
}

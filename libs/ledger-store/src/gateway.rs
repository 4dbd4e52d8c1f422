use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ledger_api::{DocumentStore, LedgerCode, LedgerQuery, MessageRecord, RecordId, StoreError};

/// Доступ к [`DocumentStore`] с ограничением по времени.
///
/// Клоны делят один backend. Каждый вызов укладывается в заданный deadline
/// или завершается [`ErrorKind::Timeout`](ledger_api::ErrorKind::Timeout).
/// Id записей назначает gateway, backend не видит записей без id.
#[derive(Clone)]
pub struct StoreGateway {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Тот же backend, другой deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            store: Arc::clone(&self.store),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn init(&self) -> Result<(), StoreError> {
        self.bounded("init", self.store.init()).await
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.bounded("ping", self.store.ping()).await
    }

    pub async fn insert(&self, mut record: MessageRecord) -> Result<RecordId, StoreError> {
        record.id.get_or_insert_with(RecordId::generate);
        let id = self.bounded("insert", self.store.insert(record)).await?;
        tracing::debug!(id = %id, "record inserted");
        Ok(id)
    }

    /// Все записи или только с `ledger_code`, новые первыми.
    pub async fn find_by_ledger_code(
        &self,
        ledger_code: Option<LedgerCode>,
    ) -> Result<Vec<MessageRecord>, StoreError> {
        let query = LedgerQuery {
            ledger_code,
            limit: None,
        };
        self.find(&query).await
    }

    pub async fn find(&self, query: &LedgerQuery) -> Result<Vec<MessageRecord>, StoreError> {
        self.bounded("find", self.store.find(query)).await
    }

    /// Идемпотентно: удаление кода без записей возвращает 0.
    pub async fn delete_by_ledger_code(&self, ledger_code: LedgerCode) -> Result<u64, StoreError> {
        let deleted = self.bounded("delete", self.store.delete(ledger_code)).await?;
        tracing::debug!(ledger_code, deleted, "records deleted");
        Ok(deleted)
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| e.with_context(op)),
            Err(_) => Err(StoreError::timeout(format!(
                "{op} exceeded {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

impl std::fmt::Debug for StoreGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreGateway")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

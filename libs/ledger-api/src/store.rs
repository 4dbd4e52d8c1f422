use std::future::Future;
use std::pin::Pin;

use crate::{LedgerCode, LedgerQuery, MessageRecord, RecordId, StoreError};

/// Backend хранилища документов для ledger-сообщений.
///
/// Реализации `Send + Sync`, их делят задача подписчика и параллельные
/// web handlers. Deadline ставит вызывающий, сам backend может работать
/// сколько нужно.
pub trait DocumentStore: Send + Sync {
    /// Подготовить backend (индексы, схема). Идемпотентно.
    fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;

    /// Дешёвая проверка доступности.
    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;

    /// Записать одну запись и вернуть её id. `record.id` ставит вызывающий,
    /// на уже существующий id backend отвечает `WriteRejected`.
    fn insert(
        &self,
        record: MessageRecord,
    ) -> Pin<Box<dyn Future<Output = Result<RecordId, StoreError>> + Send + '_>>;

    /// Записи, выбранные `query`, по убыванию `received_at`.
    fn find(
        &self,
        query: &LedgerQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MessageRecord>, StoreError>> + Send + '_>>;

    /// Удалить все записи с `ledger_code`, вернуть сколько удалено.
    fn delete(
        &self,
        ledger_code: LedgerCode,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>>;
}

use std::future::Future;
use std::pin::Pin;

use tokio::sync::RwLock;

use ledger_api::{DocumentStore, LedgerCode, LedgerQuery, MessageRecord, RecordId, StoreError};

const DEFAULT_MAX_RECORDS: usize = 1_000_000;

// ═══════════════════════════════════════════════════════════════
//  MemoryStore
// ═══════════════════════════════════════════════════════════════

/// Хранилище в памяти для тестов и локальных запусков без MongoDB.
///
/// Вставки сверх `max_records` отклоняются, сохранённые записи не вытесняются.
pub struct MemoryStore {
    records: RwLock<Vec<MessageRecord>>,
    max_records: usize,
}

impl MemoryStore {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: RwLock::new(Vec::with_capacity(max_records.min(65536))),
            max_records,
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECORDS)
    }
}

impl DocumentStore for MemoryStore {
    fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async { Ok(()) })
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async { Ok(()) })
    }

    fn insert(
        &self,
        record: MessageRecord,
    ) -> Pin<Box<dyn Future<Output = Result<RecordId, StoreError>> + Send + '_>> {
        Box::pin(async move {
            let id = record
                .id
                .clone()
                .ok_or_else(|| StoreError::write_rejected("record has no id"))?;

            let mut buf = self.records.write().await;
            if buf.len() >= self.max_records {
                return Err(StoreError::write_rejected(format!(
                    "store full ({} records)",
                    self.max_records
                )));
            }
            if buf.iter().any(|r| r.id.as_ref() == Some(&id)) {
                return Err(StoreError::write_rejected(format!("duplicate id {id}")));
            }
            buf.push(record);
            Ok(id)
        })
    }

    fn find(
        &self,
        query: &LedgerQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MessageRecord>, StoreError>> + Send + '_>> {
        let query = query.clone();
        Box::pin(async move {
            let buf = self.records.read().await;
            // Сначала обратный порядок вставки: при равных timestamp новые всё равно первыми.
            let mut result: Vec<MessageRecord> =
                buf.iter().rev().filter(|r| query.matches(r)).cloned().collect();
            result.sort_by(|a, b| b.received_at.cmp(&a.received_at));

            if let Some(limit) = query.limit {
                result.truncate(limit);
            }
            Ok(result)
        })
    }

    fn delete(
        &self,
        ledger_code: LedgerCode,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>> {
        Box::pin(async move {
            let mut buf = self.records.write().await;
            let before = buf.len();
            buf.retain(|r| r.ledger_code != ledger_code);
            Ok((before - buf.len()) as u64)
        })
    }
}

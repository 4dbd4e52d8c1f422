use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;

use ledger_api::{
    DocumentStore, ErrorKind, LedgerCode, LedgerQuery, MessageRecord, ParsedMessage, RecordId,
    StoreError,
};
use ledger_store::{MemoryStore, StoreGateway};

fn gateway() -> (Arc<MemoryStore>, StoreGateway) {
    let store = Arc::new(MemoryStore::default());
    let gateway = StoreGateway::new(store.clone(), Duration::from_secs(1));
    (store, gateway)
}

fn record(code: LedgerCode, meter: &str, millis: i64) -> MessageRecord {
    ParsedMessage {
        ledger_meter: meter.to_string(),
        ledger_code: code,
        raw_message: format!("{meter}{code:03}"),
    }
    .into_record(DateTime::<Utc>::from_timestamp_millis(millis).unwrap())
}

#[tokio::test]
async fn insert_assigns_id_and_find_returns_the_record() {
    let (_, gateway) = gateway();
    let input = record(45, "WXYZ", 1_000);
    let id = gateway.insert(input.clone()).await.unwrap();

    let found = gateway.find_by_ledger_code(Some(45)).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id.as_ref(), Some(&id));
    assert_eq!(found[0].ledger_meter, input.ledger_meter);
    assert_eq!(found[0].raw_message, input.raw_message);
    assert_eq!(found[0].received_at, input.received_at);
}

#[tokio::test]
async fn find_without_code_returns_everything_newest_first() {
    let (_, gateway) = gateway();
    gateway.insert(record(1, "AAAA", 1_000)).await.unwrap();
    gateway.insert(record(2, "BBBB", 3_000)).await.unwrap();
    gateway.insert(record(3, "CCCC", 2_000)).await.unwrap();

    let codes: Vec<LedgerCode> = gateway
        .find_by_ledger_code(None)
        .await
        .unwrap()
        .iter()
        .map(|r| r.ledger_code)
        .collect();
    assert_eq!(codes, vec![2, 3, 1]);
}

#[tokio::test]
async fn find_respects_query_limit() {
    let (_, gateway) = gateway();
    for millis in [1_000, 2_000, 3_000] {
        gateway.insert(record(9, "ZZZZ", millis)).await.unwrap();
    }
    let found = gateway
        .find(&LedgerQuery::by_code(9).with_limit(2))
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].received_at.timestamp_millis(), 3_000);
}

#[tokio::test]
async fn unknown_code_finds_nothing() {
    let (_, gateway) = gateway();
    gateway.insert(record(1, "AAAA", 1_000)).await.unwrap();
    assert!(gateway.find_by_ledger_code(Some(999)).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let (store, gateway) = gateway();
    gateway.insert(record(7, "AAAA", 1_000)).await.unwrap();
    gateway.insert(record(7, "BBBB", 2_000)).await.unwrap();
    gateway.insert(record(8, "CCCC", 3_000)).await.unwrap();

    assert_eq!(gateway.delete_by_ledger_code(7).await.unwrap(), 2);
    assert_eq!(gateway.delete_by_ledger_code(7).await.unwrap(), 0);
    assert!(gateway.find_by_ledger_code(Some(7)).await.unwrap().is_empty());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn caller_supplied_id_is_kept() {
    let (_, gateway) = gateway();
    let mut input = record(4, "DDDD", 1_000);
    let id = RecordId::generate();
    input.id = Some(id.clone());
    assert_eq!(gateway.insert(input).await.unwrap(), id);
}

// ═══════════════════════════════════════════════════════════════
//  Deadlines
// ═══════════════════════════════════════════════════════════════

/// Backend, который не отвечает ни в какой разумный deadline.
struct StalledStore;

impl StalledStore {
    fn stall<T: Send + 'static>() -> Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'static>> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(StoreError::unavailable("unreachable"))
        })
    }
}

impl DocumentStore for StalledStore {
    fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Self::stall()
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Self::stall()
    }

    fn insert(
        &self,
        _record: MessageRecord,
    ) -> Pin<Box<dyn Future<Output = Result<RecordId, StoreError>> + Send + '_>> {
        Self::stall()
    }

    fn find(
        &self,
        _query: &LedgerQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MessageRecord>, StoreError>> + Send + '_>> {
        Self::stall()
    }

    fn delete(
        &self,
        _ledger_code: LedgerCode,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>> {
        Self::stall()
    }
}

#[tokio::test]
async fn stalled_backend_surfaces_timeout() {
    let gateway = StoreGateway::new(Arc::new(StalledStore), Duration::from_millis(20));

    let err = gateway.insert(record(1, "AAAA", 0)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);

    let err = gateway.find_by_ledger_code(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);

    let err = gateway.delete_by_ledger_code(1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn with_timeout_shares_the_backend() {
    let (store, gateway) = gateway();
    let quick = gateway.with_timeout(Duration::from_millis(500));
    assert_eq!(quick.timeout(), Duration::from_millis(500));
    quick.insert(record(1, "AAAA", 0)).await.unwrap();
    assert_eq!(store.len().await, 1);
}

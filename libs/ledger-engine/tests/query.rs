use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;

use ledger_api::{DocumentStore, LedgerCode, LedgerQuery, MessageRecord, RecordId, StoreError};
use ledger_engine::{DeleteSummary, QueryError, QueryService, parse_ledger_code};
use ledger_store::{MemoryStore, StoreGateway};

fn service() -> QueryService {
    QueryService::new(StoreGateway::new(
        Arc::new(MemoryStore::default()),
        Duration::from_secs(1),
    ))
}

#[test]
fn ledger_code_parsing() {
    assert_eq!(parse_ledger_code("45").unwrap(), 45);
    assert_eq!(parse_ledger_code("-7").unwrap(), -7);
    assert_eq!(parse_ledger_code("+7").unwrap(), 7);
    assert!(matches!(parse_ledger_code(""), Err(QueryError::MissingField("ledger_code"))));
    assert!(matches!(parse_ledger_code("abc"), Err(QueryError::InvalidLedgerCode(_))));
    assert!(matches!(parse_ledger_code("4 5"), Err(QueryError::InvalidLedgerCode(_))));
}

#[tokio::test]
async fn create_then_find_then_delete() {
    let service = service();
    let created = service.create("45", "WXYZ").await.unwrap();
    assert!(created.id.is_some());
    assert_eq!(created.raw_message, "WXYZ45");
    service.create("46", "ABCD").await.unwrap();

    let found = service.find(Some("45")).await.unwrap();
    assert_eq!(found, vec![created]);
    assert_eq!(service.find(None).await.unwrap().len(), 2);
    assert_eq!(service.find(Some("")).await.unwrap().len(), 2);

    let summary = service.delete("45").await.unwrap();
    assert_eq!(
        summary,
        DeleteSummary {
            deleted_count: 1,
            ledger_code: 45,
        }
    );
    assert_eq!(service.delete("45").await.unwrap().deleted_count, 0);
    assert!(service.find(Some("45")).await.unwrap().is_empty());
}

#[tokio::test]
async fn manual_create_is_not_filtered() {
    let service = service();
    let created = service.create("123", "ABCD").await.unwrap();
    assert_eq!(created.ledger_code, 123);
    assert_eq!(service.find(Some("123")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_caps_results_newest_first() {
    let service = service();
    for meter in ["AAAA", "BBBB", "CCCC"] {
        service.create("9", meter).await.unwrap();
    }
    let listed = service.list(Some("9"), Some(2)).await.unwrap();
    let meters: Vec<&str> = listed.iter().map(|r| r.ledger_meter.as_str()).collect();
    assert_eq!(meters, vec!["CCCC", "BBBB"]);
}

#[tokio::test]
async fn empty_meter_is_a_client_error() {
    let err = service().create("45", "").await.unwrap_err();
    assert!(err.is_client_error());
    assert!(matches!(err, QueryError::MissingField("ledger_meter")));
}

// ═══════════════════════════════════════════════════════════════
//  Invalid input never reaches the store
// ═══════════════════════════════════════════════════════════════

#[derive(Default)]
struct CountingStore {
    calls: AtomicUsize,
}

impl CountingStore {
    fn hit<T: Send + 'static>(&self) -> Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'static>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Err(StoreError::unavailable("counting store")) })
    }
}

impl DocumentStore for CountingStore {
    fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        self.hit()
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        self.hit()
    }

    fn insert(
        &self,
        _record: MessageRecord,
    ) -> Pin<Box<dyn Future<Output = Result<RecordId, StoreError>> + Send + '_>> {
        self.hit()
    }

    fn find(
        &self,
        _query: &LedgerQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MessageRecord>, StoreError>> + Send + '_>> {
        self.hit()
    }

    fn delete(
        &self,
        _ledger_code: LedgerCode,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>> {
        self.hit()
    }
}

#[tokio::test]
async fn invalid_codes_are_rejected_before_the_store() {
    let store = Arc::new(CountingStore::default());
    let service = QueryService::new(StoreGateway::new(store.clone(), Duration::from_secs(1)));

    let err = service.find(Some("abc")).await.unwrap_err();
    assert!(err.is_client_error());
    let err = service.delete("12x").await.unwrap_err();
    assert!(err.is_client_error());
    let err = service.create("", "ABCD").await.unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);

    let err = service.find(Some("12")).await.unwrap_err();
    assert!(!err.is_client_error());
    assert!(!err.is_timeout());
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
}

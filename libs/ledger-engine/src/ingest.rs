use chrono::Utc;

use ledger_api::{LedgerCode, RecordId, StoreError};
use ledger_store::StoreGateway;

use crate::filter::FilterPolicy;
use crate::parser::{self, Rejection};

/// Что стало с одним payload из bus.
#[derive(Debug)]
pub enum Outcome {
    Stored(RecordId),
    Rejected(Rejection),
    Filtered(LedgerCode),
    /// Сообщение отбрасывается, retry нет.
    StoreFailed(StoreError),
}

/// Счётчики одного подписчика. `received` равен сумме остальных.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub received: u64,
    pub stored: u64,
    pub rejected: u64,
    pub filtered: u64,
    pub failed: u64,
}

impl IngestStats {
    pub fn record(&mut self, outcome: &Outcome) {
        self.received += 1;
        match outcome {
            Outcome::Stored(_) => self.stored += 1,
            Outcome::Rejected(_) => self.rejected += 1,
            Outcome::Filtered(_) => self.filtered += 1,
            Outcome::StoreFailed(_) => self.failed += 1,
        }
    }
}

/// Разбор, фильтр и сохранение, по одному payload за раз.
#[derive(Debug, Clone)]
pub struct Ingestor {
    policy: FilterPolicy,
    gateway: StoreGateway,
}

impl Ingestor {
    pub fn new(policy: FilterPolicy, gateway: StoreGateway) -> Self {
        Self { policy, gateway }
    }

    /// Не падает: любая ошибка сворачивается в [`Outcome`].
    pub async fn process(&self, payload: &[u8]) -> Outcome {
        let parsed = match parser::parse(payload) {
            Ok(parsed) => parsed,
            Err(rejection) => return Outcome::Rejected(rejection),
        };
        if !self.policy.accept(&parsed) {
            return Outcome::Filtered(parsed.ledger_code);
        }
        match self.gateway.insert(parsed.into_record(Utc::now())).await {
            Ok(id) => Outcome::Stored(id),
            Err(e) => Outcome::StoreFailed(e),
        }
    }
}

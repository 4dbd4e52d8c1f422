use std::time::Duration;

use serde::Deserialize;

use ledger_api::LedgerCode;

use crate::filter::DEFAULT_BLOCKED_LEDGER_CODE;

fn default_blocked_ledger_code() -> LedgerCode {
    DEFAULT_BLOCKED_LEDGER_CODE
}

fn default_insert_timeout_ms() -> u64 {
    5_000
}

fn default_query_timeout_ms() -> u64 {
    15_000
}

/// Секция `[ingest]`.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_blocked_ledger_code")]
    pub blocked_ledger_code: LedgerCode,
    /// Deadline одной вставки.
    #[serde(default = "default_insert_timeout_ms")]
    pub insert_timeout_ms: u64,
    /// Остановиться после такой паузы без сообщений. Без значения работает до отмены.
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,
}

impl IngestConfig {
    pub fn insert_timeout(&self) -> Duration {
        Duration::from_millis(self.insert_timeout_ms)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            blocked_ledger_code: default_blocked_ledger_code(),
            insert_timeout_ms: default_insert_timeout_ms(),
            idle_timeout_secs: None,
        }
    }
}

/// Секция `[query]`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Deadline каждого find/delete/create из query service.
    #[serde(default = "default_query_timeout_ms")]
    pub timeout_ms: u64,
}

impl QueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_query_timeout_ms(),
        }
    }
}

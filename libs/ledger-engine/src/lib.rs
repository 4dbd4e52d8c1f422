//! Обработка ledger-сообщений: разбор payload, фильтр по ledger code,
//! цикл подписчика bus → store и сервис выборки/удаления.

pub mod config;
pub mod filter;
pub mod ingest;
pub mod parser;
pub mod query;
pub mod subscriber;

pub use config::{IngestConfig, QueryConfig};
pub use filter::{DEFAULT_BLOCKED_LEDGER_CODE, FilterPolicy};
pub use ingest::{IngestStats, Ingestor, Outcome};
pub use parser::{MIN_MESSAGE_LEN, Rejection, parse};
pub use query::{DeleteSummary, QueryError, QueryService, parse_ledger_code};
pub use subscriber::{StopReason, SubscriberHandle, SubscriberReport, SubscriberState, start_subscriber};

//! Общие типы и трейты backend'ов для ledger ingestion.
//!
//! Engine, хранилища и шины связаны только через этот crate: записи ходят
//! как [`MessageRecord`], хранилище доступно через [`DocumentStore`],
//! шина через [`MessageBus`].

pub mod bus;
pub mod error;
pub mod record;
pub mod store;

pub use bus::{BusError, BusMessage, BusSubscription, MessageBus};
pub use error::{ErrorKind, StoreError};
pub use record::{LedgerCode, LedgerQuery, MessageRecord, ParsedMessage, RecordId};
pub use store::DocumentStore;

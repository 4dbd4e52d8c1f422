use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ключ поиска и удаления сообщений. Не уникален среди записей.
pub type LedgerCode = i64;

/// Непрозрачный id записи: 12-байтовый ObjectId в виде 24 hex-символов.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Новый id в формате ObjectId (timestamp, process-unique, counter).
    pub fn generate() -> Self {
        Self(bson::oid::ObjectId::new().to_hex())
    }

    /// Обернуть id, прочитанный из backend'а.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Поля принятого payload из bus, до сохранения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    /// Первые четыре символа payload.
    pub ledger_meter: String,
    /// Символы 5..=7 payload как десятичное целое.
    pub ledger_code: LedgerCode,
    /// Весь payload как есть.
    pub raw_message: String,
}

impl ParsedMessage {
    /// Проставить время получения. Id назначит store gateway.
    pub fn into_record(self, received_at: DateTime<Utc>) -> MessageRecord {
        MessageRecord {
            id: None,
            ledger_code: self.ledger_code,
            ledger_meter: self.ledger_meter,
            raw_message: self.raw_message,
            received_at,
        }
    }
}

/// Сохранённое ledger-сообщение.
///
/// В этом же виде JSON отдаёт web front end. `ledger_mtrs` принимается
/// на входе для документов от старых producer'ов.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(rename = "message_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub ledger_code: LedgerCode,
    #[serde(alias = "ledger_mtrs")]
    pub ledger_meter: String,
    pub raw_message: String,
    pub received_at: DateTime<Utc>,
}

/// Выборка по сохранённым записям. Результат всегда новые первыми.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerQuery {
    /// `None` выбирает все записи.
    pub ledger_code: Option<LedgerCode>,
    /// `None` без ограничения.
    pub limit: Option<usize>,
}

impl LedgerQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_code(ledger_code: LedgerCode) -> Self {
        Self {
            ledger_code: Some(ledger_code),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Попадает ли `record` в выборку, без учёта limit.
    pub fn matches(&self, record: &MessageRecord) -> bool {
        self.ledger_code.is_none_or(|code| record.ledger_code == code)
    }
}

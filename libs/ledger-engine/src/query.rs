use chrono::Utc;
use serde::Serialize;

use ledger_api::{ErrorKind, LedgerCode, LedgerQuery, MessageRecord, StoreError};
use ledger_store::StoreGateway;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid ledger_code '{0}': must be an integer")]
    InvalidLedgerCode(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl QueryError {
    /// Ошибка в запросе, а не в хранилище.
    pub fn is_client_error(&self) -> bool {
        matches!(self, QueryError::InvalidLedgerCode(_) | QueryError::MissingField(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, QueryError::Store(e) if e.kind() == ErrorKind::Timeout)
    }
}

/// Итог удаления, для вывода и JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    pub deleted_count: u64,
    pub ledger_code: LedgerCode,
}

/// Десятичное целое с необязательным знаком. Пустой ввод это отсутствующее поле.
pub fn parse_ledger_code(input: &str) -> Result<LedgerCode, QueryError> {
    if input.is_empty() {
        return Err(QueryError::MissingField("ledger_code"));
    }
    input
        .parse::<LedgerCode>()
        .map_err(|_| QueryError::InvalidLedgerCode(input.to_string()))
}

/// Операции оператора: чтение, удаление, ручное создание.
///
/// Ввод приходит текстом (аргументы CLI, поля формы) и проверяется здесь,
/// кривой код до хранилища не доходит.
#[derive(Debug, Clone)]
pub struct QueryService {
    gateway: StoreGateway,
}

impl QueryService {
    pub fn new(gateway: StoreGateway) -> Self {
        Self { gateway }
    }

    /// Записи с `ledger_code` или все, если код не задан или пуст.
    /// Новые первыми.
    pub async fn find(&self, ledger_code: Option<&str>) -> Result<Vec<MessageRecord>, QueryError> {
        self.list(ledger_code, None).await
    }

    /// [`find`](Self::find) с необязательным лимитом на число записей.
    pub async fn list(
        &self,
        ledger_code: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<MessageRecord>, QueryError> {
        let ledger_code = match ledger_code {
            Some(raw) if !raw.is_empty() => Some(parse_ledger_code(raw)?),
            _ => None,
        };
        let query = LedgerQuery { ledger_code, limit };
        Ok(self.gateway.find(&query).await?)
    }

    pub async fn delete(&self, ledger_code: &str) -> Result<DeleteSummary, QueryError> {
        let ledger_code = parse_ledger_code(ledger_code)?;
        let deleted_count = self.gateway.delete_by_ledger_code(ledger_code).await?;
        tracing::info!(ledger_code, deleted_count, "deleted records");
        Ok(DeleteSummary {
            deleted_count,
            ledger_code,
        })
    }

    /// Сохранить запись, введённую вручную. raw message собирается как
    /// meter + code, фильтр ingestion здесь не применяется.
    pub async fn create(
        &self,
        ledger_code: &str,
        ledger_meter: &str,
    ) -> Result<MessageRecord, QueryError> {
        let ledger_code = parse_ledger_code(ledger_code)?;
        if ledger_meter.is_empty() {
            return Err(QueryError::MissingField("ledger_meter"));
        }

        let mut record = MessageRecord {
            id: None,
            ledger_code,
            ledger_meter: ledger_meter.to_string(),
            raw_message: format!("{ledger_meter}{ledger_code}"),
            received_at: Utc::now(),
        };
        let id = self.gateway.insert(record.clone()).await?;
        record.id = Some(id);
        Ok(record)
    }
}

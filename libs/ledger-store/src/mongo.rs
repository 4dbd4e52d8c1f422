use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{DateTime as BsonDateTime, doc, oid::ObjectId};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

use ledger_api::{DocumentStore, LedgerCode, LedgerQuery, MessageRecord, RecordId, StoreError};

// ═══════════════════════════════════════════════════════════════
//  MongoConfig
// ═══════════════════════════════════════════════════════════════

fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "nats_data".to_string()
}

fn default_collection() -> String {
    "messages".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Действует и на TCP connect, и на server selection.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database: default_database(),
            collection: default_collection(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Stored document layout
// ═══════════════════════════════════════════════════════════════

/// Формат документа в коллекции. Имена полей общие для всех читателей
/// коллекции, меняются только вместе с миграцией.
#[derive(Debug, Serialize, Deserialize)]
struct MessageDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    ledger_code: LedgerCode,
    #[serde(alias = "ledger_mtrs")]
    ledger_meter: String,
    raw_message: String,
    received_at: BsonDateTime,
}

impl MessageDocument {
    fn from_record(record: MessageRecord) -> Result<Self, StoreError> {
        let id = match &record.id {
            Some(id) => ObjectId::parse_str(id.as_str()).map_err(|e| {
                StoreError::write_rejected(format!("id '{id}' is not an ObjectId: {e}"))
            })?,
            None => ObjectId::new(),
        };
        Ok(Self {
            id,
            ledger_code: record.ledger_code,
            ledger_meter: record.ledger_meter,
            raw_message: record.raw_message,
            received_at: BsonDateTime::from_millis(record.received_at.timestamp_millis()),
        })
    }

    fn into_record(self) -> Result<MessageRecord, StoreError> {
        let millis = self.received_at.timestamp_millis();
        let received_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            StoreError::decode(format!("document {}: received_at {millis} out of range", self.id))
        })?;
        Ok(MessageRecord {
            id: Some(RecordId::from_hex(self.id.to_hex())),
            ledger_code: self.ledger_code,
            ledger_meter: self.ledger_meter,
            raw_message: self.raw_message,
            received_at,
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  MongoStore
// ═══════════════════════════════════════════════════════════════

/// Хранилище на MongoDB. Одна коллекция, один документ на запись.
pub struct MongoStore {
    client: Client,
    database: String,
    collection: Collection<MessageDocument>,
}

impl MongoStore {
    /// Создать клиента. Драйвер подключается лениво, доступность сервера
    /// проверяет [`DocumentStore::ping`].
    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| StoreError::config(format!("mongo uri '{}': {e}", config.uri)))?;
        let timeout = Duration::from_millis(config.connect_timeout_ms);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options).map_err(map_mongo_error)?;
        let collection = client
            .database(&config.database)
            .collection::<MessageDocument>(&config.collection);

        Ok(Self {
            client,
            database: config.database.clone(),
            collection,
        })
    }
}

impl DocumentStore for MongoStore {
    fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async move {
            let index = IndexModel::builder()
                .keys(doc! { "ledger_code": 1, "received_at": -1 })
                .build();
            self.collection
                .create_index(index)
                .await
                .map_err(map_mongo_error)?;
            Ok(())
        })
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async move {
            self.client
                .database(&self.database)
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(map_mongo_error)?;
            Ok(())
        })
    }

    fn insert(
        &self,
        record: MessageRecord,
    ) -> Pin<Box<dyn Future<Output = Result<RecordId, StoreError>> + Send + '_>> {
        Box::pin(async move {
            let document = MessageDocument::from_record(record)?;
            let id = document.id;
            self.collection
                .insert_one(&document)
                .await
                .map_err(map_mongo_error)?;
            Ok(RecordId::from_hex(id.to_hex()))
        })
    }

    fn find(
        &self,
        query: &LedgerQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MessageRecord>, StoreError>> + Send + '_>> {
        let query = query.clone();
        Box::pin(async move {
            // Сервер трактует limit(0) как «без лимита».
            if query.limit == Some(0) {
                return Ok(Vec::new());
            }
            let filter = match query.ledger_code {
                Some(code) => doc! { "ledger_code": code },
                None => doc! {},
            };
            let mut find = self
                .collection
                .find(filter)
                .sort(doc! { "received_at": -1 });
            if let Some(limit) = query.limit {
                find = find.limit(i64::try_from(limit).unwrap_or(i64::MAX));
            }

            let cursor = find.await.map_err(map_mongo_error)?;
            let documents: Vec<MessageDocument> =
                cursor.try_collect().await.map_err(map_mongo_error)?;
            documents
                .into_iter()
                .map(MessageDocument::into_record)
                .collect()
        })
    }

    fn delete(
        &self,
        ledger_code: LedgerCode,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>> {
        Box::pin(async move {
            let result = self
                .collection
                .delete_many(doc! { "ledger_code": ledger_code })
                .await
                .map_err(map_mongo_error)?;
            Ok(result.deleted_count)
        })
    }
}

fn map_mongo_error(err: mongodb::error::Error) -> StoreError {
    use mongodb::error::ErrorKind as MongoKind;

    match err.kind.as_ref() {
        MongoKind::Write(_) => StoreError::write_rejected(err.to_string()),
        MongoKind::BsonDeserialization(_) | MongoKind::BsonSerialization(_) => {
            StoreError::decode(err.to_string())
        }
        MongoKind::InvalidArgument { .. } => StoreError::config(err.to_string()),
        _ => StoreError::unavailable(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn document_round_trip_keeps_fields_at_millisecond_precision() {
        let received_at = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_123).unwrap();
        let record = MessageRecord {
            id: Some(RecordId::generate()),
            ledger_code: 45,
            ledger_meter: "WXYZ".into(),
            raw_message: "WXYZ045tail".into(),
            received_at,
        };
        let back = MessageDocument::from_record(record.clone())
            .unwrap()
            .into_record()
            .unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn foreign_id_is_rejected() {
        let record = MessageRecord {
            id: Some(RecordId::from_hex("not-an-object-id")),
            ledger_code: 1,
            ledger_meter: "ABCD".into(),
            raw_message: "ABCD001".into(),
            received_at: Utc::now(),
        };
        let err = MessageDocument::from_record(record).unwrap_err();
        assert_eq!(err.kind(), ledger_api::ErrorKind::WriteRejected);
    }

    #[test]
    fn legacy_meter_field_decodes() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "ledger_code": 7_i32,
            "ledger_mtrs": "ABCD",
            "raw_message": "ABCD007",
            "received_at": BsonDateTime::now(),
        };
        let document: MessageDocument = mongodb::bson::from_document(raw).unwrap();
        assert_eq!(document.ledger_meter, "ABCD");
        assert_eq!(document.ledger_code, 7);
    }

    #[tokio::test]
    async fn zero_limit_finds_nothing_without_a_round_trip() {
        let config = MongoConfig {
            uri: "mongodb://127.0.0.1:1".into(),
            connect_timeout_ms: 100,
            ..MongoConfig::default()
        };
        let store = MongoStore::connect(&config).await.unwrap();
        let found = store
            .find(&LedgerQuery::by_code(45).with_limit(0))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn defaults_match_local_deployment() {
        let config = MongoConfig::default();
        assert_eq!(config.uri, "mongodb://localhost:27017");
        assert_eq!(config.database, "nats_data");
        assert_eq!(config.collection, "messages");
        assert_eq!(config.connect_timeout_ms, 10_000);
    }
}

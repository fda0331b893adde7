//! Persists one record per monthly snapshot in a key-value table.
//!
//! Records are keyed by the envelope's `created_at` value (attribute `date`)
//! and carry the fetched payload verbatim (attribute `body`). Writes are
//! unconditional, so re-running a month replaces its previous record.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Mutex;

use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use crate::envelope::Envelope;
use crate::error::{DecodeError, WriteError};

/// Key attribute name.
pub const DATE_ATTR: &str = "date";
/// Payload attribute name.
pub const BODY_ATTR: &str = "body";

/// One stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub date: String,
    pub body: String,
}

impl StoredRecord {
    /// Build the record from the bytes exactly as fetched. The body is never
    /// re-serialized from `envelope`, so fields it does not model are kept.
    pub fn from_raw(raw: &[u8], envelope: &Envelope) -> Result<Self, DecodeError> {
        Ok(Self {
            date: envelope.created_at.clone(),
            body: std::str::from_utf8(raw)?.to_string(),
        })
    }
}

/// Destination for stored records.
pub trait RecordStore {
    /// Name of the destination table, for diagnostics.
    fn table(&self) -> &str;

    /// Insert or replace the record keyed by `record.date`.
    fn put_record(
        &self,
        record: &StoredRecord,
    ) -> impl Future<Output = Result<(), WriteError>> + Send;
}

/// DynamoDB table writer.
pub struct DynamoRecordStore {
    client: Client,
    table: String,
}

impl DynamoRecordStore {
    /// Load credentials from the environment and build a client for `region`.
    pub async fn connect(region: &str, table: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::with_client(Client::new(&config), table)
    }

    /// Use an already-configured client (custom endpoints in tests).
    pub fn with_client(client: Client, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }
}

impl RecordStore for DynamoRecordStore {
    fn table(&self) -> &str {
        &self.table
    }

    async fn put_record(&self, record: &StoredRecord) -> Result<(), WriteError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item(DATE_ATTR, AttributeValue::S(record.date.clone()))
            .item(BODY_ATTR, AttributeValue::S(record.body.clone()))
            .send()
            .await
            .map_err(|e| WriteError {
                table: self.table.clone(),
                date: record.date.clone(),
                source: Box::new(e),
            })?;
        Ok(())
    }
}

/// In-process table with the same overwrite semantics. Useful for tests and
/// dry runs.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    table: String,
    inner: Mutex<MemoryTable>,
}

#[derive(Debug, Default)]
struct MemoryTable {
    rows: BTreeMap<String, String>,
    puts: usize,
    reject: Option<String>,
}

impl MemoryRecordStore {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            inner: Mutex::default(),
        }
    }

    /// Fail every put whose date equals `date`, as a throttled or invalid
    /// write would.
    pub fn rejecting(self, date: &str) -> Self {
        self.lock().reject = Some(date.to_string());
        self
    }

    /// Current contents, keyed by date.
    pub fn rows(&self) -> BTreeMap<String, String> {
        self.lock().rows.clone()
    }

    pub fn get(&self, date: &str) -> Option<String> {
        self.lock().rows.get(date).cloned()
    }

    /// Number of accepted puts, counting overwrites.
    pub fn put_count(&self) -> usize {
        self.lock().puts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryTable> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordStore for MemoryRecordStore {
    fn table(&self) -> &str {
        &self.table
    }

    async fn put_record(&self, record: &StoredRecord) -> Result<(), WriteError> {
        let mut table = self.lock();
        if table.reject.as_deref() == Some(record.date.as_str()) {
            return Err(WriteError {
                table: self.table.clone(),
                date: record.date.clone(),
                source: "put rejected".into(),
            });
        }
        table.rows.insert(record.date.clone(), record.body.clone());
        table.puts += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, body: &str) -> StoredRecord {
        StoredRecord {
            date: date.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn record_keeps_raw_bytes() {
        let raw = br#"{ "created_at" : "2024-05-01T00:00:00Z", "extra": {"k": [1,2]}, "body": [] }"#;
        let envelope = Envelope::parse(raw).unwrap();
        let stored = StoredRecord::from_raw(raw, &envelope).unwrap();
        assert_eq!(stored.date, "2024-05-01T00:00:00Z");
        assert_eq!(stored.body.as_bytes(), raw);
    }

    #[tokio::test]
    async fn memory_store_overwrites_by_date() {
        let store = MemoryRecordStore::new("stock");
        store.put_record(&record("a", "first")).await.unwrap();
        store.put_record(&record("b", "other")).await.unwrap();
        store.put_record(&record("a", "second")).await.unwrap();

        assert_eq!(store.rows().len(), 2);
        assert_eq!(store.get("a").as_deref(), Some("second"));
        assert_eq!(store.put_count(), 3);
        assert_eq!(store.table(), "stock");
    }

    #[tokio::test]
    async fn memory_store_rejection() {
        let store = MemoryRecordStore::new("stock").rejecting("bad");
        let err = store.put_record(&record("bad", "x")).await.unwrap_err();
        assert_eq!(err.table, "stock");
        assert_eq!(err.date, "bad");
        assert!(store.rows().is_empty());
        assert_eq!(store.put_count(), 0);
    }
}

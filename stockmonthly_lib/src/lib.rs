//! Library layer for the monthly stock snapshot job.
//!
//! Computes which monthly snapshot objects are in scope, fetches them from
//! object storage, decodes the small JSON envelope they carry and stores the
//! raw payload in a key-value table keyed by the envelope timestamp.

pub mod config;
pub mod dates;
pub mod envelope;
pub mod error;
pub mod fetch;
pub mod job;
pub mod path;
pub mod store;

pub use config::JobConfig;
pub use dates::{target_dates, TargetDate};
pub use envelope::{Envelope, Ticker};
pub use error::{ConfigError, DecodeError, FetchError, JobError, WriteError};
pub use fetch::ObjectFetcher;
pub use job::{run_once, RunSummary, SnapshotJob};
pub use path::{format_path, format_paths};
pub use store::{DynamoRecordStore, MemoryRecordStore, RecordStore, StoredRecord};

//! Runs one copy pass: dates, keys, then fetch, decode and store per month.
//!
//! The first failure ends the run. Months stored before it stay stored and
//! later months are never attempted.

use chrono::Datelike;
use tracing::debug;

use crate::config::JobConfig;
use crate::dates::target_dates;
use crate::envelope::Envelope;
use crate::error::JobError;
use crate::fetch::ObjectFetcher;
use crate::path::format_paths;
use crate::store::{DynamoRecordStore, RecordStore, StoredRecord};

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Months in scope.
    pub months: usize,
    pub records_written: usize,
}

/// The copy job with its long-lived clients.
pub struct SnapshotJob<S> {
    config: JobConfig,
    fetcher: ObjectFetcher,
    store: S,
}

/// Read configuration through `lookup`, connect and copy once at `now`.
pub async fn run_once<F>(lookup: F, now: impl Datelike) -> Result<RunSummary, JobError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = JobConfig::from_lookup(lookup)?;
    let job = SnapshotJob::connect(config).await?;
    job.run(now).await
}

impl SnapshotJob<DynamoRecordStore> {
    /// Build the S3 and DynamoDB clients once for the whole run.
    pub async fn connect(config: JobConfig) -> Result<Self, JobError> {
        let fetcher = ObjectFetcher::s3(&config.s3_bucket, &config.region)?;
        let store = DynamoRecordStore::connect(&config.region, &config.database_name).await;
        Ok(Self::new(config, fetcher, store))
    }
}

impl<S: RecordStore> SnapshotJob<S> {
    pub fn new(config: JobConfig, fetcher: ObjectFetcher, store: S) -> Self {
        Self {
            config,
            fetcher,
            store,
        }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Object keys in scope for a run at `now`, oldest first.
    pub fn target_paths(&self, now: impl Datelike) -> Vec<String> {
        let dates = target_dates(self.config.only_this_month, now);
        format_paths(&dates, &self.config.s3_path_format)
    }

    /// Copy every in-scope month, stopping at the first error.
    pub async fn run(&self, now: impl Datelike) -> Result<RunSummary, JobError> {
        let paths = self.target_paths(now);
        debug!(
            bucket = %self.config.s3_bucket,
            table = %self.store.table(),
            only_this_month = self.config.only_this_month,
            months = paths.len(),
            "starting snapshot copy"
        );

        let mut written = 0;
        for key in &paths {
            self.copy_one(key).await?;
            written += 1;
        }

        debug!(records = written, "snapshot copy complete");
        Ok(RunSummary {
            months: paths.len(),
            records_written: written,
        })
    }

    async fn copy_one(&self, key: &str) -> Result<(), JobError> {
        let raw = self.fetcher.fetch(key).await?;
        let decode_err = |source| JobError::Decode {
            key: key.to_string(),
            source,
        };
        let envelope = Envelope::parse(&raw).map_err(decode_err)?;
        debug!(key, positions = envelope.body.len(), "decoded envelope");

        let record = StoredRecord::from_raw(&raw, &envelope).map_err(decode_err)?;
        self.store.put_record(&record).await?;
        debug!(key, date = %record.date, "stored snapshot record");
        Ok(())
    }
}

//! Reads monthly snapshot objects from object storage.

use std::sync::Arc;

use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use tracing::debug;

use crate::error::FetchError;

/// Fetches whole objects from a single bucket.
///
/// Built once per run and reused for every month; each [`fetch`](Self::fetch)
/// is exactly one GET.
#[derive(Clone)]
pub struct ObjectFetcher {
    store: Arc<dyn ObjectStore>,
}

impl ObjectFetcher {
    /// S3 client for `bucket` in `region`. Credentials come from the usual
    /// `AWS_*` environment variables.
    pub fn s3(bucket: &str, region: &str) -> Result<Self, FetchError> {
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(region)
            .build()
            .map_err(|source| FetchError::Client {
                bucket: bucket.to_string(),
                source,
            })?;
        Ok(Self::with_store(Arc::new(store)))
    }

    /// Use an already-built store (in-memory stores in tests).
    pub fn with_store(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Read the entire object at `key` into memory.
    ///
    /// The key is used exactly as given. Keys the store would have to
    /// rewrite (empty segments, leading or trailing `/`) are rejected.
    pub async fn fetch(&self, key: &str) -> Result<Bytes, FetchError> {
        let path = object_path(key)?;
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| FetchError::from_store(key, e))?;
        let bytes = result
            .bytes()
            .await
            .map_err(|e| FetchError::from_store(key, e))?;
        debug!(key, len = bytes.len(), "fetched snapshot object");
        Ok(bytes)
    }
}

fn object_path(key: &str) -> Result<ObjectPath, FetchError> {
    let path = ObjectPath::parse(key).map_err(|source| FetchError::InvalidKey {
        key: key.to_string(),
        source: Some(source),
    })?;
    let raw: &str = path.as_ref();
    if raw != key {
        return Err(FetchError::InvalidKey {
            key: key.to_string(),
            source: None,
        });
    }
    Ok(path)
}

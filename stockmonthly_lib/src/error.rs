//! Error types for the snapshot job.
//!
//! Every failure aborts the run; the variants only exist so the log line says
//! which stage and which object or record was involved.

use thiserror::Error;

/// Boxed cause used where several backends can produce the failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Startup configuration problems, reported before any network activity.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

/// Failures retrieving a snapshot object from storage.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build object store client for bucket {bucket}")]
    Client {
        bucket: String,
        #[source]
        source: object_store::Error,
    },
    #[error("invalid object key {key:?}")]
    InvalidKey {
        key: String,
        #[source]
        source: Option<object_store::path::Error>,
    },
    #[error("object not found: {key}")]
    NotFound {
        key: String,
        #[source]
        source: object_store::Error,
    },
    #[error("failed to fetch object {key}")]
    Storage {
        key: String,
        #[source]
        source: object_store::Error,
    },
}

impl FetchError {
    pub(crate) fn from_store(key: &str, source: object_store::Error) -> Self {
        match source {
            object_store::Error::NotFound { .. } => Self::NotFound {
                key: key.to_string(),
                source,
            },
            source => Self::Storage {
                key: key.to_string(),
                source,
            },
        }
    }
}

/// The fetched bytes do not have the expected envelope shape.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8")]
    NotUtf8(#[from] std::str::Utf8Error),
    #[error("malformed envelope")]
    Json(#[from] serde_json::Error),
}

/// The key-value store refused or failed the put.
#[derive(Error, Debug)]
#[error("failed to store record {date} in table {table}")]
pub struct WriteError {
    pub table: String,
    pub date: String,
    #[source]
    pub source: BoxError,
}

/// Any failure that ends a run.
#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to decode {key}")]
    Decode {
        key: String,
        #[source]
        source: DecodeError,
    },
    #[error(transparent)]
    Write(#[from] WriteError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn not_found_is_classified_separately() {
        let source = object_store::Error::NotFound {
            path: "data/2021/06.json".to_string(),
            source: "missing".into(),
        };
        let err = FetchError::from_store("data/2021/06.json", source);
        assert!(matches!(err, FetchError::NotFound { ref key, .. } if key == "data/2021/06.json"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn other_storage_errors_keep_the_key() {
        let source = object_store::Error::Generic {
            store: "S3",
            source: "connection reset".into(),
        };
        let err = FetchError::from_store("data/2021/07.json", source);
        assert!(matches!(err, FetchError::Storage { .. }));
        assert!(err.to_string().contains("data/2021/07.json"));
        assert!(err.source().is_some());
    }

    #[test]
    fn decode_error_exposes_cause() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = JobError::Decode {
            key: "data/2021/06.json".to_string(),
            source: DecodeError::from(json_err),
        };
        assert_eq!(err.to_string(), "failed to decode data/2021/06.json");
        let cause = err.source().unwrap();
        assert_eq!(cause.to_string(), "malformed envelope");
        assert!(cause.source().is_some());
    }

    #[test]
    fn write_error_display() {
        let err = WriteError {
            table: "stock".to_string(),
            date: "2024-05-01T00:00:00Z".to_string(),
            source: "throttled".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to store record 2024-05-01T00:00:00Z in table stock"
        );
        assert_eq!(err.source().unwrap().to_string(), "throttled");
    }

    #[test]
    fn config_error_names_variable() {
        let err = JobError::from(ConfigError::Missing("S3_BUCKET"));
        assert!(err.to_string().contains("S3_BUCKET"));
    }
}

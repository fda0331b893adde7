//! Job configuration, read once at startup.

use crate::error::ConfigError;

/// Region used for both storage services unless `AWS_REGION` overrides it.
pub const DEFAULT_REGION: &str = "ap-northeast-1";

/// Everything a run needs to know about its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    /// Bucket holding the monthly snapshot objects (`S3_BUCKET`).
    pub s3_bucket: String,
    /// Key template with year and month slots, e.g. `data/%04d/%02d.json` (`S3_PATH_FORMAT`).
    pub s3_path_format: String,
    /// Destination table (`DATABASE_NAME`).
    pub database_name: String,
    /// Only copy the current month instead of the whole history (`ONLY_THIS_MONTH`).
    pub only_this_month: bool,
    pub region: String,
}

impl JobConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|val| !val.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        Ok(Self {
            s3_bucket: required("S3_BUCKET")?,
            s3_path_format: required("S3_PATH_FORMAT")?,
            database_name: required("DATABASE_NAME")?,
            only_this_month: lookup("ONLY_THIS_MONTH")
                .as_deref()
                .and_then(parse_bool)
                .unwrap_or(false),
            region: lookup("AWS_REGION")
                .filter(|val| !val.is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        })
    }
}

/// Accepts the usual boolean spellings: `1 t T TRUE true True` and their
/// false counterparts. Anything else is `None`.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use stockmonthly_lib::{run_once, JobConfig, RecordStore, SnapshotJob};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "stockmonthly=info,stockmonthly_lib=info";

/// Set by the Lambda execution environment.
const LAMBDA_RUNTIME_VAR: &str = "AWS_LAMBDA_RUNTIME_API";

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_target(false)
        .init();

    let env = |key: &str| std::env::var(key).ok();
    let outcome = if in_lambda(env) {
        serve().await
    } else {
        run_once(env, Local::now())
            .await
            .map(|_| ())
            .map_err(anyhow::Error::from)
    };

    ExitCode::from(exit_status(&outcome))
}

fn in_lambda(lookup: impl Fn(&str) -> Option<String>) -> bool {
    lookup(LAMBDA_RUNTIME_VAR).is_some_and(|val| !val.is_empty())
}

fn exit_status(outcome: &Result<()>) -> u8 {
    match outcome {
        Ok(()) => 0,
        Err(err) => {
            error!("snapshot job failed: {err:#}");
            1
        }
    }
}

/// Serve Lambda invocations until the runtime shuts the process down.
/// Clients are built once per execution environment.
async fn serve() -> Result<()> {
    let config = JobConfig::from_env().context("invalid configuration")?;
    let job = SnapshotJob::connect(config).await?;
    let job = &job;
    lambda_runtime::run(service_fn(move |event| handle(job, event)))
        .await
        .map_err(|e| anyhow!("lambda runtime failed: {e}"))
}

/// One invocation: the scheduler's event payload is ignored.
async fn handle<S: RecordStore>(
    job: &SnapshotJob<S>,
    _event: LambdaEvent<Value>,
) -> Result<(), lambda_runtime::Error> {
    if let Err(err) = job.run(Local::now()).await {
        let message = format!("snapshot job failed: {:#}", anyhow::Error::from(err));
        error!("{message}");
        return Err(message.into());
    }
    Ok(())
}

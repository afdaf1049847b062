use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use batch_core::{BatchCoordinator, BatchResult, StoreConfig};
use cache::RedisResultStore;
use clap::Parser;
use tracing::{info, warn};

mod config;
mod telemetry;

use crate::config::Config;

/// Fan-out/fan-in smoke worker.
///
/// Dispatches N simulated producer jobs against a live Redis result store,
/// collects whatever subset reported, prints the summary, and cleans up.
/// Useful for verifying a deployment's Redis connectivity and TTL behavior
/// end to end.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Batch identifier; defaults to a timestamp-derived id
    #[arg(short, long)]
    batch_id: Option<String>,

    /// Number of producer jobs to fan out
    #[arg(short, long, default_value_t = 5)]
    jobs: u32,

    /// Job index that should report a simulated failure
    #[arg(long)]
    fail_index: Option<u32>,

    /// Job indices that never report, simulating lost workers
    #[arg(long, value_delimiter = ',')]
    drop_indices: Vec<u32>,

    /// Redis URL; overrides config file and REDIS_URL
    #[arg(short, long)]
    redis_url: Option<String>,

    /// Skip the cleanup pass, leaving entries to expire via TTL
    #[arg(long)]
    no_cleanup: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;
    config.validate()?;
    telemetry::init_telemetry(&config.logging)?;

    let url = args
        .redis_url
        .or_else(|| config.store.url.clone())
        .context("No Redis URL configured; pass --redis-url or set REDIS_URL")?;

    let store = RedisResultStore::connect(&url, StoreConfig::with_ttl(config.ttl()))
        .await
        .context("Failed to connect to the result store")?;
    let coordinator = Arc::new(BatchCoordinator::new(Arc::new(store)));

    let batch_id = args
        .batch_id
        .unwrap_or_else(|| format!("smoke-{}", unix_timestamp()));
    let total_jobs = args.jobs;
    info!(batch_id = %batch_id, total_jobs, "Dispatching simulated producers");

    let mut handles = Vec::new();
    for index in 0..total_jobs {
        if args.drop_indices.contains(&index) {
            warn!(job_index = index, "Simulating lost producer; job will not report");
            continue;
        }
        let coordinator = coordinator.clone();
        let batch_id = batch_id.clone();
        let fail_index = args.fail_index;
        handles.push(tokio::spawn(async move {
            // Stagger the writes a little so the fan-out is visibly parallel
            tokio::time::sleep(Duration::from_millis(10 * u64::from(index % 7))).await;

            let result = if fail_index == Some(index) {
                BatchResult::failure(
                    format!("smoke-agent-{index}"),
                    i64::from(index),
                    "simulated producer failure",
                )
            } else {
                BatchResult::success(
                    format!("smoke-agent-{index}"),
                    i64::from(index),
                    format!("simulated response from job {index}"),
                )
            };
            coordinator.store_result(&batch_id, index, &result).await
        }));
    }

    for handle in handles {
        handle.await.context("Producer task panicked")??;
    }

    let collection = coordinator.collect(&batch_id, total_jobs).await?;
    println!(
        "batch {batch_id}: {}/{} collected ({} ok, {} failed, {} missing, {} corrupt), status {:?}",
        collection.stats.collected,
        collection.stats.expected,
        collection.stats.succeeded,
        collection.stats.failed,
        collection.stats.missing.len(),
        collection.stats.corrupt.len(),
        collection.stats.status(),
    );
    for (index, result) in &collection.results {
        let outcome = result
            .error
            .as_deref()
            .map(|e| format!("error: {e}"))
            .or_else(|| result.response.clone())
            .unwrap_or_default();
        println!("  [{index}] {} -> {outcome}", result.agent_name);
    }

    if args.no_cleanup {
        info!(batch_id = %batch_id, "Skipping cleanup; entries will expire via TTL");
    } else {
        let deleted = coordinator.cleanup(&batch_id, total_jobs).await?;
        info!(batch_id = %batch_id, deleted, "Batch cleaned up");
    }

    Ok(())
}

/// Seconds since the Unix epoch, for generated batch ids
fn unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

//! Purchase Anomaly Flagger
//!
//! Replays a batch log to build the social graph and purchase history, then
//! scores every purchase in the stream log against its buyer's neighborhood.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin flag_anomalies -- \
//!     log_input/batch_log.json log_input/stream_log.json log_output/flagged_purchases.json
//! ```
//!
//! ## Environment Variables
//!
//! - BATCH_LOG_PATH - Batch log, first line holds D and T (default: log_input/batch_log.json)
//! - STREAM_LOG_PATH - Stream log to score (default: log_input/stream_log.json)
//! - FLAGGED_OUTPUT_PATH - Flagged purchases output (default: log_output/flagged_purchases.json)
//! - RUST_LOG - Logging level (optional, default: info)

use socialflow::{pipeline, RunConfig};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = RunConfig::from_args_and_env(env::args())?;

    log::info!("🚀 Starting purchase anomaly flagger");
    log::info!("   Batch log: {}", config.batch_path.display());
    log::info!("   Stream log: {}", config.stream_path.display());
    log::info!("   Output: {}", config.output_path.display());

    match pipeline::run(&config).await {
        Ok(summary) => {
            log::info!(
                "✅ Done: {} batch lines, {} stream lines, {} flagged",
                summary.batch.lines,
                summary.stream.lines,
                summary.flagged
            );
            Ok(())
        }
        Err(e) => {
            log::error!("❌ Run aborted: {}", e);
            Err(e.into())
        }
    }
}

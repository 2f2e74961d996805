//! Pipeline driver - replays the batch log, then scores the stream log
//!
//! 1. First batch line → `Params` (fatal on error)
//! 2. Remaining batch lines → graph / ledger state, never scored
//! 3. Stream lines → state update, purchases scored and flagged ones written
//!
//! Malformed or invalid lines (blank or non-UTF-8 ones included) are logged and
//! skipped; only configuration and I/O failures stop a run.

use crate::config::{ConfigError, Params, RunConfig};
use crate::detector_core::{DetectionEngine, EventKind, LineOutcome, Source, StageTimings, Verdict};
use crate::jsonl_writer::JsonlFlagWriter;
use crate::reader::LogReader;
use crate::writer_backend::{FlagWriterBackend, WriterError};
use std::time::Instant;

#[derive(Debug)]
pub enum RunError {
    Io(std::io::Error),
    Config(ConfigError),
    Writer(WriterError),
}

impl From<std::io::Error> for RunError {
    fn from(err: std::io::Error) -> Self {
        RunError::Io(err)
    }
}

impl From<ConfigError> for RunError {
    fn from(err: ConfigError) -> Self {
        RunError::Config(err)
    }
}

impl From<WriterError> for RunError {
    fn from(err: WriterError) -> Self {
        RunError::Writer(err)
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Io(e) => write!(f, "IO error: {}", e),
            RunError::Config(e) => write!(f, "Configuration error: {}", e),
            RunError::Writer(e) => write!(f, "Output error: {}", e),
        }
    }
}

impl std::error::Error for RunError {}

/// Per-source line counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceSummary {
    pub lines: u64,
    pub rejected: u64,
    pub purchases: u64,
    pub befriends: u64,
    pub unfriends: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub batch: SourceSummary,
    pub stream: SourceSummary,
    pub scored: u64,
    pub insufficient_data: u64,
    pub flagged: u64,
    pub timings: StageTimings,
}

/// Read the D/T header from the first line of the batch log
pub async fn read_params(reader: &mut LogReader) -> Result<Params, ConfigError> {
    let raw = reader
        .read_line()
        .await
        .map_err(|e| ConfigError::MalformedHeader(e.to_string()))?
        .ok_or(ConfigError::EmptyBatchLog)?;
    let header =
        std::str::from_utf8(&raw).map_err(|e| ConfigError::MalformedHeader(e.to_string()))?;

    let params = Params::from_header(header)?;
    log::info!("Parameter D found: {}", params.depth);
    log::info!("Parameter T found: {}", params.window);
    Ok(params)
}

/// Feed every remaining line of `reader` into the engine
///
/// Flagged stream purchases are handed to `writer`; batch purchases only
/// update state.
pub async fn replay<W>(
    engine: &mut DetectionEngine,
    reader: &mut LogReader,
    source: Source,
    writer: &mut W,
    summary: &mut RunSummary,
) -> Result<(), RunError>
where
    W: FlagWriterBackend + ?Sized,
{
    let started = Instant::now();

    while let Some(line) = reader.read_line().await? {
        let outcome = engine.process_raw(&line, source);
        let counts = match source {
            Source::Batch => &mut summary.batch,
            Source::Stream => &mut summary.stream,
        };
        counts.lines += 1;

        match outcome {
            LineOutcome::Applied(kind) => match kind {
                EventKind::Purchase => counts.purchases += 1,
                EventKind::Befriend => counts.befriends += 1,
                EventKind::Unfriend => counts.unfriends += 1,
            },
            LineOutcome::Scored(verdict) => {
                counts.purchases += 1;
                summary.scored += 1;
                match verdict {
                    Verdict::Flagged(flagged) => {
                        log::info!(
                            "🎯 Flagged purchase: id {} amount {} (mean: {}, sd: {})",
                            flagged.id,
                            flagged.amount,
                            flagged.mean,
                            flagged.sd
                        );
                        writer.write_flagged(&flagged).await?;
                        summary.flagged += 1;
                    }
                    Verdict::NotFlagged => {}
                    Verdict::InsufficientData { window_len } => {
                        log::debug!(
                            "Not enough transactions ({}) at {}:{}",
                            window_len,
                            reader.path().display(),
                            reader.line_number()
                        );
                        summary.insufficient_data += 1;
                    }
                }
            }
            LineOutcome::Rejected(reason) => {
                counts.rejected += 1;
                log::warn!(
                    "⚠️  LINE ERROR {}:{} - {} | {}",
                    reader.path().display(),
                    reader.line_number(),
                    reason,
                    String::from_utf8_lossy(&line)
                );
            }
        }
    }

    log::info!(
        "✅ End {} log processing: {:.2}s",
        source.as_str().to_uppercase(),
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Run the batch and stream logs through a fresh engine into `writer`
pub async fn run_with_writer<W>(config: &RunConfig, writer: &mut W) -> Result<RunSummary, RunError>
where
    W: FlagWriterBackend + ?Sized,
{
    let mut batch = LogReader::open(&config.batch_path).await?;
    let params = read_params(&mut batch).await?;
    execute(params, batch, config, writer).await
}

/// Run with the JSONL file sink at `config.output_path`
///
/// The header is validated before the output file is created.
pub async fn run(config: &RunConfig) -> Result<RunSummary, RunError> {
    let mut batch = LogReader::open(&config.batch_path).await?;
    let params = read_params(&mut batch).await?;

    let mut writer = JsonlFlagWriter::new(&config.output_path)?;
    log::info!("📊 Backend: {}", writer.backend_type());

    execute(params, batch, config, &mut writer).await
}

async fn execute<W>(
    params: Params,
    mut batch: LogReader,
    config: &RunConfig,
    writer: &mut W,
) -> Result<RunSummary, RunError>
where
    W: FlagWriterBackend + ?Sized,
{
    let mut summary = RunSummary::default();
    let mut engine = DetectionEngine::new(params);

    replay(&mut engine, &mut batch, Source::Batch, writer, &mut summary).await?;

    let mut stream = LogReader::open(&config.stream_path).await?;
    replay(&mut engine, &mut stream, Source::Stream, writer, &mut summary).await?;

    writer.flush().await?;
    summary.timings = engine.timings();

    log::info!(
        "📊 Users: {} | purchases recorded: {}",
        engine.users().len(),
        engine.purchases_recorded()
    );
    log::info!("⏱️  time_social: {:.2}s", summary.timings.neighborhood.as_secs_f64());
    log::info!("⏱️  time_transaction: {:.2}s", summary.timings.collection.as_secs_f64());
    log::info!("⏱️  time_compute: {:.2}s", summary.timings.scoring.as_secs_f64());
    log::info!(
        "✅ Flagged {} of {} scored purchases ({} with insufficient data, {} lines rejected)",
        summary.flagged,
        summary.scored,
        summary.insufficient_data,
        summary.batch.rejected + summary.stream.rejected
    );

    Ok(summary)
}

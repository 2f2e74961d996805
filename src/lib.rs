#[cfg(test)]
mod tests;

pub mod config;
pub mod detector_core;
pub mod jsonl_writer;
pub mod pipeline;
pub mod reader;
pub mod writer_backend;

pub use config::{ConfigError, Params, RunConfig};
pub use pipeline::{run, run_with_writer, RunError, RunSummary};

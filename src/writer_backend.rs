//! Sinks for flagged purchases: the async backend trait and an in-memory writer

use crate::detector_core::FlaggedPurchase;
use async_trait::async_trait;

#[derive(Debug)]
pub enum WriterError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl From<std::io::Error> for WriterError {
    fn from(err: std::io::Error) -> Self {
        WriterError::Io(err)
    }
}

impl From<serde_json::Error> for WriterError {
    fn from(err: serde_json::Error) -> Self {
        WriterError::Serialization(err)
    }
}

impl std::fmt::Display for WriterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriterError::Io(e) => write!(f, "IO error: {}", e),
            WriterError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for WriterError {}

/// Backend trait for writing flagged purchases
#[async_trait]
pub trait FlagWriterBackend: Send {
    /// Write a single flagged purchase
    async fn write_flagged(&mut self, flagged: &FlaggedPurchase) -> Result<(), WriterError>;

    /// Flush pending writes to storage
    async fn flush(&mut self) -> Result<(), WriterError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}

/// Keeps flagged purchases in memory, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryFlagWriter {
    pub flagged: Vec<FlaggedPurchase>,
}

impl MemoryFlagWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlagWriterBackend for MemoryFlagWriter {
    async fn write_flagged(&mut self, flagged: &FlaggedPurchase) -> Result<(), WriterError> {
        self.flagged.push(flagged.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), WriterError> {
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

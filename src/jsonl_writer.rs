//! JSONL writer for flagged purchases - one object per line, fixed key order

use crate::detector_core::FlaggedPurchase;
use crate::writer_backend::{FlagWriterBackend, WriterError};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::Formatter;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Compact JSON with a space after each `,` and `:`, ASCII only
///
/// `{"event_type": "purchase", "timestamp": "2017-06-13 11:33:02", ...}`
///
/// Characters above U+007F are written as `\uXXXX` escapes (lowercase hex,
/// UTF-16 surrogate pairs outside the BMP).
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> std::io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> std::io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> std::io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> std::io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serialize one flagged purchase into `writer` (without the newline)
pub fn write_record<W: Write>(writer: W, flagged: &FlaggedPurchase) -> Result<(), WriterError> {
    let mut ser = serde_json::Serializer::with_formatter(writer, SpacedFormatter);
    flagged.serialize(&mut ser)?;
    Ok(())
}

pub struct JsonlFlagWriter {
    file: BufWriter<File>,
    written: u64,
}

impl JsonlFlagWriter {
    /// Create (or truncate) the output file, creating parent directories
    pub fn new(path: impl AsRef<Path>) -> Result<Self, WriterError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        log::info!("📝 Writing flagged purchases to: {}", path.display());

        Ok(Self {
            file: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn write_line(&mut self, flagged: &FlaggedPurchase) -> Result<(), WriterError> {
        write_record(&mut self.file, flagged)?;
        self.file.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl Drop for JsonlFlagWriter {
    fn drop(&mut self) {
        let _ = self.file.flush();
    }
}

#[async_trait]
impl FlagWriterBackend for JsonlFlagWriter {
    async fn write_flagged(&mut self, flagged: &FlaggedPurchase) -> Result<(), WriterError> {
        self.write_line(flagged)?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), WriterError> {
        self.file.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}

//! Asynchronous JSONL log reader

use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct LogReader {
    path: PathBuf,
    reader: BufReader<File>,
    line_number: u64,
}

impl LogReader {
    /// Open a log file for line-by-line reading
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await?;

        log::info!("📖 Reading log: {}", path.display());

        Ok(Self {
            path,
            reader: BufReader::new(file),
            line_number: 0,
        })
    }

    /// Read the next line as raw bytes, without its `\n` or `\r\n` terminator
    ///
    /// Bytes are not decoded here: a line that is not UTF-8 is the caller's
    /// to reject, and only read failures surface as errors. Blank lines are
    /// returned like any other. Returns `Ok(None)` at end of file.
    pub async fn read_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// 1-based number of the last line read
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

//! JSON-lines record sink

use crate::product::ProductRecord;
use crate::sink::traits::{RecordSink, SinkError, SinkResult};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends one JSON object per line to a records file
pub struct JsonlSink {
    writer: BufWriter<File>,
    emitted: u64,
}

impl JsonlSink {
    /// Creates the sink, its parent directories, and the output file
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            emitted: 0,
        })
    }

    /// Number of records written so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl RecordSink for JsonlSink {
    fn emit(&mut self, record: &ProductRecord) -> SinkResult<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.emitted += 1;
        Ok(())
    }

    fn finish(&mut self) -> SinkResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

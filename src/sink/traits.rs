//! Record sink trait and error type

use crate::product::ProductRecord;
use thiserror::Error;

/// Errors that can occur while emitting records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Consumer of completed product records
///
/// Records are handed over by reference but conceptually by value: a record
/// is immutable once assembled and the sink owns whatever representation it
/// writes.
pub trait RecordSink {
    /// Emits one record
    fn emit(&mut self, record: &ProductRecord) -> SinkResult<()>;

    /// Flushes any buffered output; called once when the crawl ends
    fn finish(&mut self) -> SinkResult<()> {
        Ok(())
    }
}

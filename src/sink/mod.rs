//! Output sinks: records, images, and debug artifacts
//!
//! The crawl core hands each sink plain values (a record, a URL list and a
//! product id, raw page bytes) and never looks back. All sink failures
//! except record-file IO are non-fatal by design.

mod debug;
mod images;
mod jsonl;
mod traits;

pub use debug::DebugStore;
pub use images::{image_file_name, ImageStore};
pub use jsonl::JsonlSink;
pub use traits::{RecordSink, SinkError, SinkResult};

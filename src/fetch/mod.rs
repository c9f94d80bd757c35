//! Fetch module: the HTTP client and the optional rendering collaborator
//!
//! All network suspension points of the crawler go through this module.
//! Connection pooling, timeouts and proxying are configuration concerns
//! handled by the client; the crawl control logic never touches them.

mod client;
mod renderer;

pub use client::{build_http_client, fetch_page, FetchOutcome};
pub use renderer::{RenderedPage, Renderer};

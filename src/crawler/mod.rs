//! Crawler module: the crawl driver
//!
//! Ties the suggestion resolver, the pagination controller, the product
//! assembler and the sinks together into one linear pipeline:
//! seed keyword -> (keyword, category) pairs -> listing pages -> product
//! pages -> emitted records.

mod driver;

pub use driver::{CrawlTotals, Driver};

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl
///
/// # Arguments
///
/// * `config` - The validated crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlTotals)` - Crawl completed; counters for the run
/// * `Err(HarvestError)` - Crawl could not start or the record sink failed
pub async fn crawl(config: Config) -> Result<CrawlTotals> {
    let mut driver = Driver::new(config)?;
    driver.run().await
}

//! Search module: tasks, listing parsing, and pagination control
//!
//! This is the control core of the crawler: the sequence of decisions that
//! turns one (keyword, category) pair into a bounded set of fetched product
//! pages.

mod listing;
mod pagination;
mod task;

pub use listing::{extract_product_id, parse_count, parse_listing, ListingPage, ProductLink};
pub use pagination::{advance, PaginationState, StopReason};
pub use task::{SearchSeed, SearchTask};

//! Pagination state machine
//!
//! One state machine instance exists per (keyword, category) pair. The
//! transition function is pure: it looks at the parsed listing page and the
//! current page number and decides whether the chain continues. All fetch
//! side effects live in the crawl driver.

use crate::search::listing::ListingPage;
use std::fmt;

/// State of one pagination chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    /// Waiting for (or about to request) the given 1-based page
    FetchingPage(u32),

    /// Chain finished; no further requests are issued
    Done(StopReason),
}

/// Why a pagination chain stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The server reported zero total results
    NoResults,

    /// The page carried no parseable current-page indicator. The chain
    /// stops rather than guessing: a missing indicator usually means a
    /// degraded or interstitial page, and is logged, not retried.
    PageIndicatorMissing,

    /// The server rendered a different page than the one requested
    PageMismatch,

    /// The configured per-keyword page ceiling was reached
    MaxPagesReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoResults => "no results",
            Self::PageIndicatorMissing => "page indicator missing",
            Self::PageMismatch => "server rendered a different page",
            Self::MaxPagesReached => "max pages reached",
        };
        write!(f, "{}", s)
    }
}

impl PaginationState {
    /// Returns true once the chain has finished
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Decides the next state after processing the listing page for
/// `current_page`
///
/// Invariant: the returned state never asks for a page above `max_pages`,
/// and never for any page other than `current_page + 1`.
pub fn advance(current_page: u32, listing: &ListingPage, max_pages: u32) -> PaginationState {
    if listing.total_results == 0 {
        return PaginationState::Done(StopReason::NoResults);
    }

    match listing.reported_page {
        None => return PaginationState::Done(StopReason::PageIndicatorMissing),
        Some(reported) if reported != current_page => {
            return PaginationState::Done(StopReason::PageMismatch);
        }
        Some(_) => {}
    }

    if current_page >= max_pages {
        return PaginationState::Done(StopReason::MaxPagesReached);
    }

    PaginationState::FetchingPage(current_page + 1)
}

//! Search task types
//!
//! A `SearchSeed` is a (keyword, category) pair produced by the suggestion
//! resolver (or directly from configuration); a `SearchTask` is one page of
//! pagination work for such a pair. Both are transient, single-owner
//! values.

use crate::config::{EndpointConfig, SearchConfig};
use url::Url;

/// A (keyword, category) pair to run a pagination chain for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSeed {
    /// The keyword actually searched
    pub keyword: String,

    /// The seed keyword this one was derived from (equal to `keyword`
    /// when suggestions were not used)
    pub source_keyword: String,

    /// Category id the search is scoped to
    pub category_id: String,
}

/// One unit of pagination work: a (keyword, category, page) triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTask {
    pub keyword: String,
    pub source_keyword: String,
    pub category_id: String,
    /// 1-based page number
    pub page_number: u32,
}

impl SearchTask {
    /// Starts a pagination chain at page 1 for a seed
    pub fn first_page(seed: &SearchSeed) -> Self {
        Self {
            keyword: seed.keyword.clone(),
            source_keyword: seed.source_keyword.clone(),
            category_id: seed.category_id.clone(),
            page_number: 1,
        }
    }

    /// The task for the following page of the same chain
    pub fn next_page(&self) -> Self {
        Self {
            page_number: self.page_number + 1,
            ..self.clone()
        }
    }

    /// Builds the search results URL for this task
    pub fn url(
        &self,
        endpoints: &EndpointConfig,
        search: &SearchConfig,
    ) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&endpoints.search_base_url)?;

        url.query_pairs_mut()
            .append_pair("_nkw", &self.keyword)
            .append_pair("_from", "R40")
            .append_pair("rt", "nc")
            .append_pair("_sacat", &self.category_id)
            .append_pair("_ipg", &search.results_per_page.to_string())
            .append_pair("_sop", "12")
            .append_pair("_pgn", &self.page_number.to_string());

        Ok(url)
    }

    /// Keyword as shown in logs, with its source when they differ
    pub fn display_keyword(&self) -> String {
        if self.keyword == self.source_keyword {
            self.keyword.clone()
        } else {
            format!("{} (source: {})", self.keyword, self.source_keyword)
        }
    }
}

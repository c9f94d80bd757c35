//! Keyword suggestion resolver
//!
//! Turns one seed keyword into the set of (keyword, category) pairs that
//! will actually be searched. Every failure mode along the way - transport,
//! bad JSON, empty suggestion lists - degrades to the same fallback: the
//! seed keyword itself, once per allowed category. The seed is always
//! eventually searched.

use crate::config::{Config, EndpointConfig};
use crate::fetch::{fetch_page, FetchOutcome};
use crate::search::SearchSeed;
use crate::suggest::parser::{parse_suggestions, Suggestion};
use reqwest::Client;
use url::Url;

/// Builds the autosuggest request URL for a keyword
pub fn suggestion_url(endpoints: &EndpointConfig, keyword: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&endpoints.suggestion_base_url)?;

    url.query_pairs_mut()
        .append_pair("kwd", keyword)
        .append_pair("sId", "0")
        .append_pair("_rs", "1")
        .append_pair("_richres", "1")
        .append_pair("callback", &endpoints.suggestion_callback)
        .append_pair("_store", "1")
        .append_pair("_help", "0")
        .append_pair("_richsug", "1")
        .append_pair("_eprogram", "1")
        .append_pair("_td", "1")
        .append_pair("_nearme", "1")
        .append_pair("_nls", "0");

    Ok(url)
}

/// The fallback expansion: the seed keyword under every allowed category
pub fn fallback_seeds(seed: &str, allowed_categories: &[String]) -> Vec<SearchSeed> {
    allowed_categories
        .iter()
        .map(|category| SearchSeed {
            keyword: seed.to_string(),
            source_keyword: seed.to_string(),
            category_id: category.clone(),
        })
        .collect()
}

/// Maps parsed suggestions onto search seeds
///
/// Suggestions without a category of their own get the default category.
pub fn seeds_from_suggestions(
    seed: &str,
    suggestions: &[Suggestion],
    default_category: &str,
) -> Vec<SearchSeed> {
    suggestions
        .iter()
        .map(|suggestion| SearchSeed {
            keyword: suggestion.keyword.clone(),
            source_keyword: seed.to_string(),
            category_id: suggestion
                .category_id
                .clone()
                .unwrap_or_else(|| default_category.to_string()),
        })
        .collect()
}

/// Resolves a seed keyword into search seeds via the suggestion endpoint
///
/// Never fails: any problem along the way falls back to `fallback_seeds`.
pub async fn resolve_seeds(client: &Client, config: &Config, seed: &str) -> Vec<SearchSeed> {
    let url = match suggestion_url(&config.endpoints, seed) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("Could not build suggestion URL for '{}': {}", seed, e);
            return fallback_seeds(seed, &config.search.allowed_categories);
        }
    };

    tracing::info!("Fetching suggestions for '{}' from {}", seed, url);

    let body = match fetch_page(client, url.as_str()).await {
        FetchOutcome::Success { body, .. } => body,
        FetchOutcome::HttpError { status, .. } => {
            tracing::warn!(
                "Suggestion endpoint answered {} for '{}', using seed keyword",
                status,
                seed
            );
            return fallback_seeds(seed, &config.search.allowed_categories);
        }
        FetchOutcome::NetworkError { error } => {
            tracing::warn!(
                "Suggestion fetch failed for '{}' ({}), using seed keyword",
                seed,
                error
            );
            return fallback_seeds(seed, &config.search.allowed_categories);
        }
    };

    let suggestions = parse_suggestions(&body, &config.endpoints.suggestion_callback);
    if suggestions.is_empty() {
        tracing::warn!("No valid suggestions for '{}', using seed keyword", seed);
        return fallback_seeds(seed, &config.search.allowed_categories);
    }

    tracing::info!(
        "Resolved '{}' into {} suggested keyword(s)",
        seed,
        suggestions.len()
    );
    seeds_from_suggestions(seed, &suggestions, config.search.default_category_id())
}

//! Canonical product record
//!
//! One schema, stable across the crawler: extraction code populates exactly
//! these fields and the sinks serialize them as-is. `product_id` and `link`
//! are always populated, even for degraded records.

use serde::{Deserialize, Serialize};

/// Sentinel title for records produced from a challenge interstitial
pub const CHALLENGE_TITLE: &str = "CHALLENGE_PAGE_HIT";

/// The structured output entity, one per visited product page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    // Product information
    pub product_id: String,
    pub link: String,
    pub title: Option<String>,
    pub price: Option<String>,
    pub condition: Option<String>,
    pub brand: Option<String>,
    /// Item location with the "Located in:" prefix stripped
    pub location: Option<String>,
    pub return_policy: Option<String>,
    pub description: Option<String>,
    pub image_urls: Vec<String>,

    // Seller information
    pub seller_name: Option<String>,
    pub seller_link: Option<String>,
    pub seller_feedback_count: Option<u64>,
    /// Positive feedback share as displayed, e.g. "99.5%"
    pub seller_positive_feedback: Option<String>,
    pub seller_items_sold: Option<u64>,
    pub top_rated_seller: bool,

    // Search provenance
    pub derived_from_keyword: String,
    pub category_context: String,
}

impl ProductRecord {
    /// An otherwise-empty record carrying only identity and provenance
    pub fn empty(
        product_id: String,
        link: String,
        derived_from_keyword: String,
        category_context: String,
    ) -> Self {
        Self {
            product_id,
            link,
            title: None,
            price: None,
            condition: None,
            brand: None,
            location: None,
            return_policy: None,
            description: None,
            image_urls: Vec::new(),
            seller_name: None,
            seller_link: None,
            seller_feedback_count: None,
            seller_positive_feedback: None,
            seller_items_sold: None,
            top_rated_seller: false,
            derived_from_keyword,
            category_context,
        }
    }

    /// The degraded record emitted for a challenge interstitial: identity
    /// and provenance survive, everything else is null
    pub fn challenge(
        product_id: String,
        link: String,
        derived_from_keyword: String,
        category_context: String,
    ) -> Self {
        let mut record = Self::empty(product_id, link, derived_from_keyword, category_context);
        record.title = Some(CHALLENGE_TITLE.to_string());
        record
    }

    /// True for records produced without real extraction
    pub fn is_degraded(&self) -> bool {
        self.title.as_deref() == Some(CHALLENGE_TITLE)
    }
}

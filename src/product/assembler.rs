//! Product record assembly
//!
//! Takes a fetched product page body and produces either a complete record,
//! a degraded challenge record, or a missing-critical-fields verdict. The
//! assembler itself is pure; debug-artifact persistence and the chained
//! description fetch are driven by the caller.

use crate::product::extract::{
    self, all_text_joined, collect_image_urls, first_match, parse_feedback_count,
    parse_items_sold, parse_positive_percentage,
};
use crate::product::record::ProductRecord;
use scraper::Html;
use url::Url;

/// URL fragments identifying anti-bot interstitial pages
pub const CHALLENGE_URL_PATTERNS: &[&str] =
    &["splashui/challenge", "distil_r_captcha.html", "SecCaptcha"];

/// Search provenance carried from the listing that discovered the product
#[derive(Debug, Clone)]
pub struct ProductContext {
    pub product_id: String,
    pub derived_from_keyword: String,
    pub category_context: String,
}

/// Outcome of assembling one product page
#[derive(Debug)]
pub enum Assembled {
    /// Record extracted; `description_src` points at the embedded
    /// description document when one must still be fetched and merged
    Complete {
        record: ProductRecord,
        description_src: Option<String>,
    },

    /// A critical field could not be extracted; the record is suppressed
    /// and debug artifacts should be persisted
    MissingCritical {
        missing_title: bool,
        missing_price: bool,
    },
}

/// Returns true when a URL points at a challenge interstitial rather than
/// product content
pub fn is_challenge_url(url: &str) -> bool {
    CHALLENGE_URL_PATTERNS
        .iter()
        .any(|pattern| url.contains(pattern))
}

/// Assembles a product record from a fetched page body
pub fn assemble(html: &str, page_url: &Url, ctx: &ProductContext) -> Assembled {
    let document = Html::parse_document(html);

    let title = all_text_joined(&document, extract::TITLE, " ");
    let price = extract_price(&document);

    // Title and price are the two critical fields: a record without them
    // is not worth emitting.
    if title.is_none() || price.is_none() {
        return Assembled::MissingCritical {
            missing_title: title.is_none(),
            missing_price: price.is_none(),
        };
    }

    let mut record = ProductRecord::empty(
        ctx.product_id.clone(),
        page_url.to_string(),
        ctx.derived_from_keyword.clone(),
        ctx.category_context.clone(),
    );
    record.title = title;
    record.price = price;

    record.condition = all_text_joined(&document, extract::CONDITION, " ");
    record.brand = first_match(&document, extract::BRAND);
    record.location = first_match(&document, extract::LOCATION).map(|text| strip_location(&text));
    record.return_policy = first_match(&document, extract::RETURN_POLICY);
    record.description = first_match(&document, extract::DESCRIPTION_FALLBACK);
    record.image_urls = collect_image_urls(&document, page_url);

    record.seller_name = first_match(&document, extract::SELLER_NAME);
    record.seller_link = first_match(&document, extract::SELLER_LINK)
        .and_then(|href| page_url.join(&href).ok())
        .map(|u| u.to_string());
    record.seller_feedback_count =
        first_match(&document, extract::FEEDBACK_COUNT).and_then(|t| parse_feedback_count(&t));
    record.seller_positive_feedback = first_match(&document, extract::POSITIVE_FEEDBACK)
        .and_then(|t| parse_positive_percentage(&t));
    record.seller_items_sold =
        first_match(&document, extract::ITEMS_SOLD).and_then(|t| parse_items_sold(&t));
    record.top_rated_seller = first_match(&document, extract::TOP_RATED)
        .map(|t| t.to_lowercase().contains("top rated"))
        .unwrap_or(false);

    let description_src = first_match(&document, extract::DESCRIPTION_IFRAME)
        .and_then(|src| page_url.join(&src).ok())
        .map(|u| u.to_string());

    Assembled::Complete {
        record,
        description_src,
    }
}

/// Price extraction: a USD approximation wins over the primary price block
fn extract_price(document: &Html) -> Option<String> {
    if let Some(approx) = first_match(document, extract::PRICE_APPROX) {
        if approx.contains("US $") {
            return Some(approx);
        }
    }

    first_match(document, extract::PRICE_PRIMARY)
}

/// Extracts the description text from a fetched description sub-document
pub fn extract_description_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let body_selector = scraper::Selector::parse("body").ok()?;
    let body = document.select(&body_selector).next()?;

    let text = body
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn strip_location(text: &str) -> String {
    text.trim()
        .strip_prefix("Located in:")
        .map(str::trim)
        .unwrap_or(text.trim())
        .to_string()
}

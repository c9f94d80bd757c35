//! Search-results page parser
//!
//! Extracts from one listing page everything the pagination controller
//! needs: the declared total-result count, the product links (after the
//! sponsored-lead skip and the relevance-break truncation), the page number
//! the server claims to have rendered, and the next-page href.

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Marker text the marketplace inserts between relevant results and the
/// looser "matching fewer words" tail; links after it are not collected
const RELEVANCE_BREAK_MARKER: &str = "Results matching fewer words";

/// A product link discovered on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLink {
    /// Numeric item id extracted from the link
    pub product_id: String,

    /// Absolute URL of the product page
    pub url: String,
}

/// Everything the controller reads off one search-results page
#[derive(Debug, Clone)]
pub struct ListingPage {
    /// Total result count the server claims for the whole query
    pub total_results: u64,

    /// Page number the server claims to have rendered, when parseable
    pub reported_page: Option<u32>,

    /// Product links in page order, sponsored lead skipped
    pub products: Vec<ProductLink>,

    /// Href of the next-page control, when present
    pub next_page_href: Option<String>,

    /// Whether collection stopped at the relevance-break marker
    pub truncated_at_relevance_break: bool,
}

/// Parses a search-results page
pub fn parse_listing(html: &str, base_url: &Url, sponsored_lead_skip: usize) -> ListingPage {
    let document = Html::parse_document(html);

    let total_results = extract_total_results(&document);
    let reported_page = extract_reported_page(&document);
    let next_page_href = extract_next_href(&document, base_url);
    let (products, truncated_at_relevance_break) =
        extract_product_links(&document, base_url, sponsored_lead_skip);

    ListingPage {
        total_results,
        reported_page,
        products,
        next_page_href,
        truncated_at_relevance_break,
    }
}

/// Extracts the numeric item id from a product URL
pub fn extract_product_id(url: &str) -> Option<String> {
    let re = Regex::new(r"/itm/(\d+)").ok()?;
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parses a count like "1,234" or "500+" from display text
pub fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

fn extract_total_results(document: &Html) -> u64 {
    const SELECTORS: &[&str] = &[
        "div.srp-controls__count h1.srp-controls__count-heading span.BOLD",
        "h1.srp-controls__count-heading span.BOLD",
    ];

    for raw in SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect();
            if let Some(count) = parse_count(&text) {
                return count;
            }
        }
    }

    0
}

fn extract_reported_page(document: &Html) -> Option<u32> {
    const SELECTORS: &[&str] = &[
        r#"a.pagination__item[aria-current="page"]"#,
        r#"ol.pagination__items a[aria-current="page"]"#,
        r#"li.pagination__item--selected a"#,
    ];

    for raw in SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect();
            if let Ok(page) = text.trim().parse::<u32>() {
                return Some(page);
            }
        }
    }

    None
}

fn extract_next_href(document: &Html, base_url: &Url) -> Option<String> {
    let selector = Selector::parse("a.pagination__next").ok()?;
    let href = document
        .select(&selector)
        .next()
        .and_then(|a| a.value().attr("href"))?;

    base_url.join(href.trim()).ok().map(|u| u.to_string())
}

fn extract_product_links(
    document: &Html,
    base_url: &Url,
    sponsored_lead_skip: usize,
) -> (Vec<ProductLink>, bool) {
    let mut products = Vec::new();
    let mut truncated = false;

    let Ok(item_selector) = Selector::parse("li.s-item, li.srp-river-answer") else {
        return (products, truncated);
    };
    let Ok(link_selector) = Selector::parse("a.s-item__link") else {
        return (products, truncated);
    };
    let Ok(bold_selector) = Selector::parse("span.BOLD") else {
        return (products, truncated);
    };

    for (index, item) in document.select(&item_selector).enumerate() {
        // The first few entries are sponsored placements dressed as results
        if index < sponsored_lead_skip {
            continue;
        }

        let hit_break = item.select(&bold_selector).any(|span| {
            span.text()
                .collect::<String>()
                .contains(RELEVANCE_BREAK_MARKER)
        });
        if hit_break {
            truncated = true;
            break;
        }

        let Some(href) = item
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };

        let Ok(absolute) = base_url.join(href.trim()) else {
            continue;
        };

        let Some(product_id) = extract_product_id(absolute.as_str()) else {
            continue;
        };

        products.push(ProductLink {
            product_id,
            url: absolute.to_string(),
        });
    }

    (products, truncated)
}

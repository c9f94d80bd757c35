//! Field extraction strategy chains
//!
//! The marketplace has shipped several generations of product page markup,
//! so every field is read through an ordered chain of strategies tried in
//! sequence until one yields a non-empty value. Chains are data; applying
//! them is a pure function over a parsed document, unit-testable per field
//! without any network I/O.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// What to read from a matched element
#[derive(Debug, Clone, Copy)]
pub enum Target {
    /// The element's text content, whitespace-normalized
    Text,
    /// An attribute value
    Attr(&'static str),
}

/// One extraction strategy: a CSS selector, what to read from matches, and
/// an optional text filter standing in for the `:contains()` pseudo-class
/// the selectors were originally written with
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    pub selector: &'static str,
    pub target: Target,
    pub text_contains: Option<&'static str>,
}

const fn text(selector: &'static str) -> Strategy {
    Strategy {
        selector,
        target: Target::Text,
        text_contains: None,
    }
}

const fn attr(selector: &'static str, name: &'static str) -> Strategy {
    Strategy {
        selector,
        target: Target::Attr(name),
        text_contains: None,
    }
}

const fn text_containing(selector: &'static str, needle: &'static str) -> Strategy {
    Strategy {
        selector,
        target: Target::Text,
        text_contains: Some(needle),
    }
}

// ===== Field chains =====

/// The title may be split across multiple spans; joined, not first-matched
pub const TITLE: &[Strategy] = &[
    text(r#"div[data-testid="x-item-title"] h1.x-item-title__mainTitle span.ux-textspans--BOLD"#),
    text("h1.x-item-title__mainTitle span.ux-textspans"),
    text("h1.x-item-title__mainTitle"),
    attr(r#"meta[property="og:title"]"#, "content"),
];

/// USD approximation shown for foreign-currency listings; preferred
pub const PRICE_APPROX: &[Strategy] = &[text_containing(
    r#"div.x-price-approx[data-testid="x-price-approx"] span.ux-textspans--BOLD"#,
    "US $",
)];

pub const PRICE_PRIMARY: &[Strategy] = &[
    text_containing(
        r#"div.x-price-primary[data-testid="x-price-primary"] span.ux-textspans"#,
        "US $",
    ),
    text(r#"div.x-price-primary[data-testid="x-price-primary"] span.ux-textspans"#),
    attr(r#"span[itemprop="price"]"#, "content"),
];

pub const CONDITION: &[Strategy] = &[
    text(r#"div[data-testid="x-item-condition"] div.x-item-condition-text span.ux-textspans"#),
    text("dl.ux-labels-values--condition dd span.ux-textspans"),
    text("div#vi-itm-cond"),
];

pub const BRAND: &[Strategy] = &[
    text("dl.ux-labels-values--brand dd span.ux-textspans"),
    text("div.ux-labels-values--brand dd span.ux-textspans"),
];

pub const LOCATION: &[Strategy] = &[
    text_containing("span.ux-textspans--SECONDARY", "Located in:"),
    text("div.ux-labels-values--deliverto dd span.ux-textspans--SECONDARY"),
];

pub const RETURN_POLICY: &[Strategy] = &[
    text("dl.ux-labels-values--returns dd span.ux-textspans"),
    text(r#"div[data-testid="x-returns-minview"] span.ux-textspans"#),
];

/// Page-level description fallbacks; the real description usually lives in
/// an embedded frame resolved by a secondary fetch
pub const DESCRIPTION_FALLBACK: &[Strategy] = &[
    attr(r#"meta[name="description"]"#, "content"),
    attr(r#"meta[property="og:description"]"#, "content"),
];

/// Where the embedded description document hides
pub const DESCRIPTION_IFRAME: &[Strategy] = &[
    attr("iframe#desc_ifr", "src"),
    attr("div#desc_ifr", "src"),
    attr(r#"div[data-testid="d-item-description"] iframe"#, "src"),
];

const IMAGES: &[Strategy] = &[
    attr("div.ux-image-carousel-item img", "data-zoom-src"),
    attr("div.ux-image-carousel-container img", "data-zoom-src"),
    attr("div.ux-image-carousel-item img", "src"),
    attr(
        r#"div[data-testid="grid-container"] button.ux-image-grid-item img"#,
        "src",
    ),
    attr("img#icImg", "src"),
    attr(r#"meta[property="og:image"]"#, "content"),
];

pub const SELLER_NAME: &[Strategy] = &[
    text("div.x-store-information__store-name a span.ux-textspans--BOLD"),
    attr("div.x-store-information__store-name", "title"),
    text("div.x-sellercard-atf__info__about-seller a span.ux-textspans--BOLD"),
    text(r#"a[data-testid="seller-profile-link"] span"#),
];

pub const SELLER_LINK: &[Strategy] = &[
    attr("div.x-store-information__store-name a", "href"),
    attr(r#"div.x-sellercard-atf__info__about-seller a[href*="/str/"]"#, "href"),
    attr(r#"a[data-testid="seller-profile-link"]"#, "href"),
];

pub const FEEDBACK_COUNT: &[Strategy] = &[
    text("h2.fdbk-detail-list__title span.SECONDARY"),
    text_containing(
        "div.x-sellercard-atf__data-item span.ux-textspans--SECONDARY",
        "Feedback",
    ),
    text(r#"a[href*="fdbk/feedback_profile"] span"#),
];

pub const POSITIVE_FEEDBACK: &[Strategy] = &[
    text_containing(
        "div.x-store-information__highlights span.ux-textspans",
        "% positive feedback",
    ),
    text("div.x-sellercard-atf__data-item span.ux-textspans--POSITIVE"),
    text_containing("div.x-sellercard-atf__data-item span", "%"),
];

pub const TOP_RATED: &[Strategy] = &[
    text_containing("div.x-sellercard-atf__badge span.ux-textspans", "Top Rated"),
    text_containing("span.ux-textspans", "Top Rated Seller"),
];

pub const ITEMS_SOLD: &[Strategy] = &[text_containing(
    "h4.x-store-information__highlights span",
    "items sold",
)];

// ===== Chain application =====

/// Applies a chain and returns the first non-empty value
pub fn first_match(document: &Html, chain: &[Strategy]) -> Option<String> {
    for strategy in chain {
        let Ok(selector) = Selector::parse(strategy.selector) else {
            continue;
        };

        for element in document.select(&selector) {
            if !passes_filter(&element, strategy) {
                continue;
            }

            let value = match strategy.target {
                Target::Text => element_text(&element),
                Target::Attr(name) => match element.value().attr(name) {
                    Some(v) => v.trim().to_string(),
                    None => continue,
                },
            };

            if !value.is_empty() {
                return Some(value);
            }
        }
    }

    None
}

/// Applies a chain and joins the text of every match of the first strategy
/// that produces anything
pub fn all_text_joined(document: &Html, chain: &[Strategy], join: &str) -> Option<String> {
    for strategy in chain {
        let Ok(selector) = Selector::parse(strategy.selector) else {
            continue;
        };

        let mut parts = Vec::new();
        for element in document.select(&selector) {
            if !passes_filter(&element, strategy) {
                continue;
            }

            let piece = match strategy.target {
                Target::Text => element_text(&element),
                Target::Attr(name) => element
                    .value()
                    .attr(name)
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default(),
            };

            if !piece.is_empty() {
                parts.push(piece);
            }
        }

        if !parts.is_empty() {
            return Some(parts.join(join));
        }
    }

    None
}

/// Collects every image URL across all image strategies, upgraded to the
/// large size variant, absolutized, de-duplicated in page order
pub fn collect_image_urls(document: &Html, base_url: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for strategy in IMAGES {
        let Ok(selector) = Selector::parse(strategy.selector) else {
            continue;
        };
        let Target::Attr(name) = strategy.target else {
            continue;
        };

        for element in document.select(&selector) {
            let Some(raw) = element.value().attr(name) else {
                continue;
            };
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let upgraded = upgrade_image_url(raw);
            let Ok(absolute) = base_url.join(&upgraded) else {
                continue;
            };
            let absolute = absolute.to_string();

            if seen.insert(absolute.clone()) {
                urls.push(absolute);
            }
        }
    }

    urls
}

/// Rewrites a thumbnail size token to the large image variant
pub fn upgrade_image_url(url: &str) -> String {
    match Regex::new(r"(?i)/s-l\d+\.(jpg|jpeg|png|webp)") {
        Ok(re) => re.replace(url, "/s-l1600.$1").into_owned(),
        Err(_) => url.to_string(),
    }
}

fn passes_filter(element: &ElementRef, strategy: &Strategy) -> bool {
    match strategy.text_contains {
        Some(needle) => element.text().collect::<String>().contains(needle),
        None => true,
    }
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ===== Numeric text parsing =====

/// Parses a feedback count like "(12,345)", "1.2K" or "3M"
pub fn parse_feedback_count(text: &str) -> Option<u64> {
    let re = Regex::new(r"(\d[\d,\.]*)\s*([KkMm])?").ok()?;
    let caps = re.captures(text)?;

    let number: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(ref s) if s == "K" => 1_000.0,
        Some(ref s) if s == "M" => 1_000_000.0,
        _ => 1.0,
    };

    Some((number * multiplier) as u64)
}

/// Pulls a percentage like "99.5%" out of display text
pub fn parse_positive_percentage(text: &str) -> Option<String> {
    let re = Regex::new(r"(\d+\.?\d*)%").ok()?;
    let caps = re.captures(text)?;
    Some(format!("{}%", caps.get(1)?.as_str()))
}

/// Parses "1,234 items sold" style highlight text
pub fn parse_items_sold(text: &str) -> Option<u64> {
    let re = Regex::new(r"(?i)([\d,]+)\s*items sold").ok()?;
    let caps = re.captures(text)?;
    caps.get(1)?.as_str().replace(',', "").parse().ok()
}

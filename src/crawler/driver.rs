//! Crawl driver - main orchestration logic
//!
//! One logical driver turns configuration into a finished crawl:
//! seed keywords are resolved into (keyword, category) pairs, each pair
//! runs its pagination chain sequentially, and discovered product pages are
//! fetched concurrently under a semaphore bound. Page `n+1` of a chain is
//! never requested before page `n`'s response has been processed; there are
//! no ordering guarantees across chains or products.

use crate::config::Config;
use crate::fetch::{build_http_client, fetch_page, FetchOutcome, Renderer};
use crate::product::{
    assemble, extract_description_text, is_challenge_url, Assembled, ProductContext, ProductRecord,
};
use crate::search::{
    advance, parse_listing, PaginationState, ProductLink, SearchSeed, SearchTask,
};
use crate::sink::{DebugStore, ImageStore, JsonlSink, RecordSink};
use crate::suggest::{fallback_seeds, resolve_seeds};
use crate::{ConfigError, HarvestError};
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Counters reported at the end of a crawl
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlTotals {
    pub search_pages_fetched: u64,
    pub products_dispatched: u64,
    pub records_emitted: u64,
    pub records_degraded: u64,
    pub extractions_failed: u64,
    pub fetch_failures: u64,
}

/// What became of one dispatched product page
#[derive(Debug)]
enum ProductOutcome {
    /// Fully extracted record, ready to emit
    Record(ProductRecord),

    /// Challenge interstitial: sentinel record, still emitted
    Degraded(ProductRecord),

    /// Critical fields missing; debug artifacts written, record suppressed
    Suppressed,

    /// Transport failure; logged, nothing emitted
    FetchFailed,
}

/// Main crawl driver
pub struct Driver {
    config: Arc<Config>,
    client: Client,
    renderer: Option<Renderer>,
    records: JsonlSink,
    debug: Arc<DebugStore>,
    images: Arc<ImageStore>,
    fetch_permits: Arc<Semaphore>,
    totals: CrawlTotals,
}

impl Driver {
    /// Creates a driver from validated configuration
    ///
    /// An empty keyword list aborts here: a crawl with no seeds is a
    /// configuration error, not an empty result.
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        if config.search.keywords.is_empty() {
            return Err(ConfigError::Validation(
                "no seed keywords configured, aborting crawl".to_string(),
            )
            .into());
        }

        let client = build_http_client(&config.network)?;
        let records = JsonlSink::create(Path::new(&config.output.records_path))?;
        let debug = Arc::new(DebugStore::new(&config.output.debug_dir));
        let images = Arc::new(ImageStore::new(&config.output.images_dir));
        let fetch_permits = Arc::new(Semaphore::new(config.network.max_concurrent_fetches as usize));

        Ok(Self {
            config: Arc::new(config),
            client,
            renderer: None,
            records,
            debug,
            images,
            fetch_permits,
            totals: CrawlTotals::default(),
        })
    }

    /// Runs the crawl to completion
    pub async fn run(&mut self) -> Result<CrawlTotals, HarvestError> {
        if self.config.rendering.enabled && self.renderer.is_none() {
            self.renderer =
                Some(Renderer::connect(&self.config.rendering.webdriver_url).await?);
        }

        let seeds = self.config.search.keywords.clone();
        for seed in &seeds {
            let pairs = if self.config.search.use_suggestions {
                resolve_seeds(&self.client, &self.config, seed).await
            } else {
                tracing::info!("Using seed keyword directly: '{}'", seed);
                fallback_seeds(seed, &self.config.search.allowed_categories)
            };

            for pair in pairs {
                self.run_chain(&pair).await?;
            }
        }

        self.records.finish()?;
        if let Some(renderer) = self.renderer.take() {
            renderer.close().await;
        }

        tracing::info!(
            "Crawl finished: {} search pages, {} products dispatched, {} records emitted \
             ({} degraded), {} extractions failed, {} fetch failures",
            self.totals.search_pages_fetched,
            self.totals.products_dispatched,
            self.totals.records_emitted,
            self.totals.records_degraded,
            self.totals.extractions_failed,
            self.totals.fetch_failures,
        );

        Ok(self.totals)
    }

    /// Runs one pagination chain for a (keyword, category) pair
    async fn run_chain(&mut self, seed: &SearchSeed) -> Result<(), HarvestError> {
        let mut task = SearchTask::first_page(seed);
        let mut products_in_flight: JoinSet<ProductOutcome> = JoinSet::new();

        loop {
            let url = task.url(&self.config.endpoints, &self.config.search)?;
            tracing::info!(
                "Fetching search page {} for '{}' (category {})",
                task.page_number,
                task.display_keyword(),
                task.category_id
            );

            let (final_url, body) = match fetch_page(&self.client, url.as_str()).await {
                FetchOutcome::Success { final_url, body, .. } => (final_url, body),
                FetchOutcome::HttpError { status, .. } => {
                    tracing::error!("Search page request failed: {} (HTTP {})", url, status);
                    break;
                }
                FetchOutcome::NetworkError { error } => {
                    tracing::error!("Search page request failed: {} ({})", url, error);
                    break;
                }
            };
            self.totals.search_pages_fetched += 1;

            let base_url = Url::parse(&final_url).unwrap_or(url);
            let listing =
                parse_listing(&body, &base_url, self.config.search.sponsored_lead_skip);

            tracing::info!(
                "Page {} for '{}': {} total results, {} product links{}",
                task.page_number,
                task.display_keyword(),
                listing.total_results,
                listing.products.len(),
                if listing.truncated_at_relevance_break {
                    " (truncated at relevance break)"
                } else {
                    ""
                }
            );

            if listing.total_results > 0 {
                self.dispatch_products(&task, &listing.products, &mut products_in_flight)
                    .await?;
            }

            match advance(
                task.page_number,
                &listing,
                self.config.search.max_pages_per_keyword,
            ) {
                PaginationState::FetchingPage(_) => {
                    if listing.next_page_href.is_none() {
                        tracing::debug!(
                            "No next-page control on page {}, continuing by page number",
                            task.page_number
                        );
                    }
                    task = task.next_page();
                }
                PaginationState::Done(reason) => {
                    tracing::info!(
                        "Stopping pagination for '{}' at page {}: {}",
                        task.display_keyword(),
                        task.page_number,
                        reason
                    );
                    break;
                }
            }
        }

        // Settle every product fetch of this chain before starting the next
        while let Some(joined) = products_in_flight.join_next().await {
            match joined {
                Ok(outcome) => self.record_outcome(outcome).await?,
                Err(e) => {
                    tracing::error!("Product task failed to complete: {}", e);
                    self.totals.fetch_failures += 1;
                }
            }
        }

        Ok(())
    }

    /// Dispatches the product links of one listing page
    async fn dispatch_products(
        &mut self,
        task: &SearchTask,
        products: &[ProductLink],
        in_flight: &mut JoinSet<ProductOutcome>,
    ) -> Result<(), HarvestError> {
        for link in products {
            self.totals.products_dispatched += 1;

            let ctx = ProductContext {
                product_id: link.product_id.clone(),
                derived_from_keyword: task.keyword.clone(),
                category_context: task.category_id.clone(),
            };

            if self.renderer.is_some() {
                // A WebDriver session renders one page at a time; products
                // are processed inline
                let outcome = self.process_rendered(link, ctx).await;
                self.record_outcome(outcome).await?;
            } else {
                in_flight.spawn(process_product(
                    self.client.clone(),
                    self.debug.clone(),
                    self.fetch_permits.clone(),
                    link.clone(),
                    ctx,
                ));
            }
        }

        Ok(())
    }

    /// Fetches one product through the rendering collaborator
    async fn process_rendered(&self, link: &ProductLink, ctx: ProductContext) -> ProductOutcome {
        let Some(renderer) = &self.renderer else {
            return ProductOutcome::FetchFailed;
        };

        let rendered = match renderer.render(&link.url).await {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::error!("Render failed for {}: {}", link.url, e);
                return ProductOutcome::FetchFailed;
            }
        };

        extract_product(
            &self.client,
            &self.debug,
            link,
            ctx,
            rendered.final_url,
            rendered.html,
            Some(renderer),
        )
        .await
    }

    /// Applies one product outcome to the sinks and counters
    async fn record_outcome(&mut self, outcome: ProductOutcome) -> Result<(), HarvestError> {
        match outcome {
            ProductOutcome::Record(record) => {
                if self.config.output.download_images && !record.image_urls.is_empty() {
                    self.images
                        .store_all(&self.client, &record.product_id, &record.image_urls)
                        .await;
                }
                self.records.emit(&record)?;
                self.totals.records_emitted += 1;
            }
            ProductOutcome::Degraded(record) => {
                tracing::error!("Failed to parse (challenge page): {}", record.link);
                self.records.emit(&record)?;
                self.totals.records_emitted += 1;
                self.totals.records_degraded += 1;
            }
            ProductOutcome::Suppressed => {
                self.totals.extractions_failed += 1;
            }
            ProductOutcome::FetchFailed => {
                self.totals.fetch_failures += 1;
            }
        }

        Ok(())
    }
}

/// Fetches and extracts one product page over plain HTTP
///
/// Spawned onto the runtime; the semaphore bounds how many of these hold a
/// connection at once.
async fn process_product(
    client: Client,
    debug: Arc<DebugStore>,
    permits: Arc<Semaphore>,
    link: ProductLink,
    ctx: ProductContext,
) -> ProductOutcome {
    let _permit = match permits.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => return ProductOutcome::FetchFailed,
    };

    let (final_url, body) = match fetch_page(&client, &link.url).await {
        FetchOutcome::Success { final_url, body, .. } => (final_url, body),
        FetchOutcome::HttpError { final_url, status } => {
            // Challenge interstitials sometimes answer with an error status
            if is_challenge_url(&final_url) {
                return ProductOutcome::Degraded(challenge_record(&link, &ctx));
            }
            tracing::error!("Product fetch failed for {}: HTTP {}", link.url, status);
            return ProductOutcome::FetchFailed;
        }
        FetchOutcome::NetworkError { error } => {
            tracing::error!("Product fetch failed for {}: {}", link.url, error);
            return ProductOutcome::FetchFailed;
        }
    };

    extract_product(&client, &debug, &link, ctx, final_url, body, None).await
}

/// Shared extraction path for plain and rendered product pages
async fn extract_product(
    client: &Client,
    debug: &DebugStore,
    link: &ProductLink,
    ctx: ProductContext,
    final_url: String,
    body: String,
    renderer: Option<&Renderer>,
) -> ProductOutcome {
    if is_challenge_url(&final_url) {
        tracing::warn!("Hit a challenge page, cannot extract data: {}", final_url);
        return ProductOutcome::Degraded(challenge_record(link, &ctx));
    }

    let page_url = match Url::parse(&final_url).or_else(|_| Url::parse(&link.url)) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("Unusable product URL {}: {}", final_url, e);
            return ProductOutcome::FetchFailed;
        }
    };

    match assemble(&body, &page_url, &ctx) {
        Assembled::MissingCritical {
            missing_title,
            missing_price,
        } => {
            tracing::warn!(
                "Missing critical fields for {}: title={}, price={}",
                page_url,
                !missing_title,
                !missing_price
            );

            debug.write_html(&ctx.product_id, &body);
            if let Some(renderer) = renderer {
                if let Some(shot) = renderer.screenshot().await {
                    debug.write_screenshot(&ctx.product_id, &shot);
                }
            }

            ProductOutcome::Suppressed
        }
        Assembled::Complete {
            mut record,
            description_src,
        } => {
            // The real description often lives in an embedded sub-document
            // and needs one more fetch before the record is final
            if let Some(src) = description_src {
                match fetch_page(client, &src).await {
                    FetchOutcome::Success { body, .. } => {
                        if let Some(text) = extract_description_text(&body) {
                            record.description = Some(text);
                        }
                    }
                    outcome => {
                        tracing::debug!("Description fetch failed for {}: {:?}", src, outcome);
                    }
                }
            }

            ProductOutcome::Record(record)
        }
    }
}

fn challenge_record(link: &ProductLink, ctx: &ProductContext) -> ProductRecord {
    ProductRecord::challenge(
        ctx.product_id.clone(),
        link.url.clone(),
        ctx.derived_from_keyword.clone(),
        ctx.category_context.clone(),
    )
}

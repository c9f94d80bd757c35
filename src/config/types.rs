use serde::Deserialize;

/// Main configuration structure for Market Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    pub endpoints: EndpointConfig,
    pub network: NetworkConfig,
    #[serde(default)]
    pub rendering: RenderingConfig,
    pub output: OutputConfig,
}

/// Search behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Seed keywords to search for
    pub keywords: Vec<String>,

    /// Whether to expand each seed keyword through the autosuggest endpoint
    #[serde(rename = "use-suggestions", default)]
    pub use_suggestions: bool,

    /// Category ids to search under; the first doubles as the default for
    /// suggestions that carry no category of their own
    #[serde(rename = "allowed-categories", default = "default_categories")]
    pub allowed_categories: Vec<String>,

    /// Maximum search result pages fetched per (keyword, category) pair
    #[serde(rename = "max-pages-per-keyword")]
    pub max_pages_per_keyword: u32,

    /// Listing entries requested per results page
    #[serde(rename = "results-per-page", default = "default_results_per_page")]
    pub results_per_page: u32,

    /// Number of leading listing entries treated as sponsored and skipped
    #[serde(rename = "sponsored-lead-skip", default = "default_sponsored_skip")]
    pub sponsored_lead_skip: usize,
}

/// Endpoint URLs for the target marketplace
///
/// These are configurable so the whole pipeline can be pointed at a mock
/// server in tests.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the search results endpoint
    #[serde(rename = "search-base-url")]
    pub search_base_url: String,

    /// Base URL of the autosuggest endpoint
    #[serde(rename = "suggestion-base-url")]
    pub suggestion_base_url: String,

    /// JSONP callback name the suggestion endpoint wraps its payload in
    /// ("0" disables real wrapping but is still sent as a parameter)
    #[serde(rename = "suggestion-callback", default = "default_callback")]
    pub suggestion_callback: String,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// User agent string sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum simultaneous in-flight product page fetches
    #[serde(rename = "max-concurrent-fetches", default = "default_concurrency")]
    pub max_concurrent_fetches: u32,

    /// Optional upstream proxy for anonymized fetching (e.g. a local Tor
    /// HTTP proxy)
    #[serde(rename = "proxy-url", default)]
    pub proxy_url: Option<String>,
}

/// Optional headless-rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RenderingConfig {
    /// Whether product pages are fetched through a WebDriver session
    #[serde(default)]
    pub enabled: bool,

    /// WebDriver endpoint to connect to
    #[serde(rename = "webdriver-url", default = "default_webdriver_url")]
    pub webdriver_url: String,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webdriver_url: default_webdriver_url(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON-lines record file
    #[serde(rename = "records-path")]
    pub records_path: String,

    /// Directory product images are mirrored into, one subdirectory per
    /// product id
    #[serde(rename = "images-dir")]
    pub images_dir: String,

    /// Whether image URLs from emitted records are downloaded at all
    #[serde(rename = "download-images", default)]
    pub download_images: bool,

    /// Directory failed-extraction artifacts are written to
    #[serde(rename = "debug-dir")]
    pub debug_dir: String,
}

fn default_categories() -> Vec<String> {
    vec!["0".to_string()]
}

fn default_results_per_page() -> u32 {
    240
}

fn default_sponsored_skip() -> usize {
    2
}

fn default_callback() -> String {
    "0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_concurrency() -> u32 {
    8
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

impl SearchConfig {
    /// The category id applied to suggestions that carry none of their own
    pub fn default_category_id(&self) -> &str {
        self.allowed_categories
            .first()
            .map(String::as_str)
            .unwrap_or("0")
    }
}

//! HTTP fetcher implementation
//!
//! This module builds the shared HTTP client and wraps page fetches in an
//! outcome enum so callers never have to inspect `reqwest` errors directly.
//! Retry, backoff and proxying policy live here (or in the configured
//! upstream proxy), never in the crawl control logic.

use crate::config::NetworkConfig;
use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects; challenge interstitials are detected
        /// from this, not the requested URL
        final_url: String,
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// Final URL after redirects
        final_url: String,
        /// The HTTP status code
        status: u16,
    },

    /// Network-level failure (timeout, connection refused, TLS, ...)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    /// Returns true if the fetch produced a usable body
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Builds the shared HTTP client from network configuration
///
/// Redirects are followed (the default policy): landing on a challenge
/// interstitial is observed through the final URL of the response.
pub fn build_http_client(config: &NetworkConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy_url) = &config.proxy_url {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    builder.build()
}

/// Fetches a URL and classifies the result
///
/// No retry is attempted at this layer; a failed fetch is logged by the
/// caller and dropped.
pub async fn fetch_page(client: &Client, url: &str) -> FetchOutcome {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                return FetchOutcome::HttpError {
                    final_url,
                    status: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchOutcome::Success {
                    final_url,
                    status: status.as_u16(),
                    body,
                },
                Err(e) => FetchOutcome::NetworkError {
                    error: format!("failed to read body: {}", e),
                },
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                "connection refused".to_string()
            } else {
                e.to_string()
            };
            FetchOutcome::NetworkError { error }
        }
    }
}

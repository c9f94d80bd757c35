//! Optional WebDriver rendering collaborator
//!
//! Some product pages only expose their fields after JavaScript runs. When
//! rendering is enabled, product pages are navigated through a WebDriver
//! session and the rendered source is handed to the same extraction code the
//! plain HTTP path uses. The session is a black box to the rest of the
//! crawler: navigate, read the source, optionally take a screenshot.

use crate::HarvestError;
use fantoccini::{Client, ClientBuilder};

/// A rendered page as observed by the browser
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL the browser ended up on after navigation and redirects
    pub final_url: String,

    /// Rendered page source
    pub html: String,
}

/// Wrapper around a single WebDriver session
pub struct Renderer {
    client: Client,
}

impl Renderer {
    /// Connects to the WebDriver endpoint
    pub async fn connect(webdriver_url: &str) -> Result<Self, HarvestError> {
        let client = ClientBuilder::native().connect(webdriver_url).await?;
        tracing::debug!("Connected to WebDriver at {}", webdriver_url);
        Ok(Self { client })
    }

    /// Navigates to a URL and returns the rendered page
    pub async fn render(&self, url: &str) -> Result<RenderedPage, HarvestError> {
        self.client.goto(url).await?;

        let final_url = self.client.current_url().await?.to_string();
        let html = self.client.source().await?;

        Ok(RenderedPage { final_url, html })
    }

    /// Takes a screenshot of the current page
    ///
    /// Screenshot failures are never worth failing an extraction over: the
    /// caller gets `None` and the debug artifact is HTML-only.
    pub async fn screenshot(&self) -> Option<Vec<u8>> {
        match self.client.screenshot().await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!("Screenshot failed: {}", e);
                None
            }
        }
    }

    /// Closes the WebDriver session
    pub async fn close(self) {
        if let Err(e) = self.client.close().await {
            tracing::warn!("Failed to close WebDriver session: {}", e);
        }
    }
}

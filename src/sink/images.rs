//! Product image store
//!
//! Downloads the image URLs of an emitted record into a directory
//! namespaced by product id. File names are content-addressed by a hash of
//! the source URL, so re-crawling the same product overwrites rather than
//! duplicates. Per-URL failures are logged and skipped; the crawl never
//! fails over an image.

use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Derives the stored file name for an image URL
pub fn image_file_name(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}.jpg", &digest[..40])
}

/// Downloads record images under a root directory, one subdirectory per
/// product id
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where a given image URL would be stored for a product
    pub fn target_path(&self, product_id: &str, url: &str) -> PathBuf {
        self.root.join(product_id).join(image_file_name(url))
    }

    /// Downloads every URL for a product; returns how many were stored
    pub async fn store_all(&self, client: &Client, product_id: &str, urls: &[String]) -> usize {
        if urls.is_empty() {
            return 0;
        }

        let product_dir = self.root.join(product_id);
        if let Err(e) = tokio::fs::create_dir_all(&product_dir).await {
            tracing::warn!(
                "Could not create image directory {}: {}",
                product_dir.display(),
                e
            );
            return 0;
        }

        let mut stored = 0;
        for url in urls {
            match self.store_one(client, &product_dir, url).await {
                Ok(()) => stored += 1,
                Err(e) => {
                    tracing::warn!("Image download failed for {}: {}", url, e);
                }
            }
        }

        tracing::debug!(
            "Stored {}/{} images for product {}",
            stored,
            urls.len(),
            product_id
        );
        stored
    }

    async fn store_one(
        &self,
        client: &Client,
        product_dir: &Path,
        url: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let response = client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()).into());
        }

        let bytes = response.bytes().await?;
        let target = product_dir.join(image_file_name(url));
        tokio::fs::write(&target, &bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_image_file_name_is_stable() {
        let a = image_file_name("https://img.example/g/abc/s-l1600.jpg");
        let b = image_file_name("https://img.example/g/abc/s-l1600.jpg");
        let c = image_file_name("https://img.example/g/def/s-l1600.jpg");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 44); // 40 hex chars + ".jpg"
        assert!(a.ends_with(".jpg"));
    }

    #[test]
    fn test_target_path_is_namespaced_by_product() {
        let store = ImageStore::new("/tmp/images");
        let path = store.target_path("123456789", "https://img.example/a.jpg");

        assert!(path.starts_with("/tmp/images/123456789"));
    }

    #[tokio::test]
    async fn test_store_all_downloads_images() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/one.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake jpeg one".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/img/two.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake jpeg two".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let store = ImageStore::new(dir.path());
        let client = Client::new();

        let urls = vec![
            format!("{}/img/one.jpg", server.uri()),
            format!("{}/img/two.jpg", server.uri()),
        ];
        let stored = store.store_all(&client, "42", &urls).await;

        assert_eq!(stored, 2);
        for url in &urls {
            let target = store.target_path("42", url);
            assert!(target.exists(), "missing {}", target.display());
        }
    }

    #[tokio::test]
    async fn test_store_all_survives_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/good.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/img/gone.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let store = ImageStore::new(dir.path());
        let client = Client::new();

        let urls = vec![
            format!("{}/img/good.jpg", server.uri()),
            format!("{}/img/gone.jpg", server.uri()),
        ];
        let stored = store.store_all(&client, "42", &urls).await;

        assert_eq!(stored, 1);
    }

    #[tokio::test]
    async fn test_store_all_empty_list_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = ImageStore::new(dir.path());
        let client = Client::new();

        assert_eq!(store.store_all(&client, "42", &[]).await, 0);
        assert!(!dir.path().join("42").exists());
    }
}

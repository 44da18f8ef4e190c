use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;

/// HTTP client for fetching HTML pages with a bounded timeout
pub struct PageClient {
    client: Client,
}

impl PageClient {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let client = Self::build_client(user_agent, timeout_secs)?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the body, failing on any non-success status
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.send_get_request(url).await?;

        let status = response.status();
        if !status.is_success() {
            bail!("{} returned status {}", url, status);
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))
    }

    fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .default_headers(Self::browser_headers())
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }

    // Some sites answer 403 to clients that do not look like a browser
    fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers
    }

    async fn send_get_request(&self, url: &str) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))
    }
}

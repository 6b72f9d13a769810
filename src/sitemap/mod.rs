//! Sitemap fetching, parsing, and analysis
//!
//! Fetches XML sitemaps over HTTP, parses both standard `urlset` documents
//! and `sitemapindex` files, and derives URL-pattern, validation, domain,
//! and update-frequency reports from the entries.

pub mod analysis;
pub mod parser;


use anyhow::{Context, Result, anyhow};
use std::time::Duration;
use tracing::{debug, error, warn};
use ureq::Agent;
use url::Url;

use crate::config::FetchConfig;

pub use self::parser::{SitemapDocument, SitemapKind, UrlEntry, parse_sitemap};

/// A fetched sitemap body plus its size on the wire.
#[derive(Debug, Clone)]
pub struct FetchedSitemap {
    pub body: String,
    pub content_bytes: usize,
}

/// HTTP client for sitemap retrieval with bounded retry logic.
#[derive(Debug)]
pub struct SitemapClient {
    agent: Agent,
    config: FetchConfig,
}

impl SitemapClient {
    /// Create a new client with the given fetch configuration.
    #[inline]
    pub fn new(config: FetchConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .user_agent(&config.user_agent)
            .build()
            .into();

        Self { agent, config }
    }

    /// Fetch a sitemap URL, retrying retryable failures up to the
    /// configured budget.
    #[inline]
    pub async fn fetch(&self, url: &str) -> Result<FetchedSitemap> {
        validate_url(url)?;

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!("Retrying sitemap fetch for {} (attempt {})", url, attempt + 1);
                tokio::time::sleep(Duration::from_secs(self.config.retry_delay_seconds)).await;
            }

            match self.try_get(url) {
                Ok(fetched) => {
                    debug!(
                        "Fetched {} bytes from {} (attempt {})",
                        fetched.content_bytes,
                        url,
                        attempt + 1
                    );
                    return Ok(fetched);
                }
                Err(e) if is_retryable_error(&e) && attempt < self.config.max_retries => {
                    warn!("Retryable error fetching {}: {}", url, e);
                    last_error = Some(e);
                }
                Err(e) => {
                    error!("Non-retryable error fetching {}: {}", url, e);
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("All retry attempts failed")))
    }

    /// Fetch and parse in one step.
    #[inline]
    pub async fn fetch_document(&self, url: &str) -> Result<(SitemapDocument, usize)> {
        let fetched = self.fetch(url).await?;
        let document = parse_sitemap(&fetched.body)
            .with_context(|| format!("Failed to parse sitemap from {}", url))?;
        Ok((document, fetched.content_bytes))
    }

    fn try_get(&self, url: &str) -> Result<FetchedSitemap> {
        debug!("Making HTTP GET request to: {}", url);

        match self.agent.get(url).call() {
            Ok(mut response) => {
                let body = response
                    .body_mut()
                    .read_to_string()
                    .with_context(|| format!("Failed to read response body from {}", url))?;
                let content_bytes = body.len();
                Ok(FetchedSitemap {
                    body,
                    content_bytes,
                })
            }
            Err(ureq::Error::StatusCode(code)) => {
                debug!("HTTP request failed with status {}: {}", code, url);
                Err(anyhow!("HTTP error {}", code))
            }
            Err(e) => {
                debug!("HTTP request failed with transport error: {}", e);
                Err(anyhow::Error::from(e))
                    .with_context(|| format!("Failed to make HTTP request to {}", url))
            }
        }
    }
}

impl Default for SitemapClient {
    #[inline]
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

/// Check if an error is retryable (network timeouts, 5xx errors, 429).
fn is_retryable_error(error: &anyhow::Error) -> bool {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("timeout")
        || error_str.contains("connection")
        || error_str.contains("network")
    {
        return true;
    }

    if error_str.contains("http error 5") {
        return true;
    }

    if error_str.contains("http error 429") {
        return true;
    }

    false
}

/// Validate that a sitemap URL is well-formed and uses http(s).
#[inline]
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str).with_context(|| format!("Invalid URL format: {}", url_str))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!("URL must use HTTP or HTTPS scheme: {}", url_str));
    }

    Ok(url)
}

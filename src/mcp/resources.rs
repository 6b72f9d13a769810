//! MCP Resources Implementation
//!
//! Read-only sitemap data exposed through uri templates:
//! `data://sitemap/{url}` for a summary of a sitemap and
//! `data://sitemap/updates/{url}` for its update metadata.

use crate::mcp::protocol::Resource;
use crate::mcp::server::ResourceHandler;
use crate::sitemap::SitemapClient;
use crate::sitemap::analysis;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

/// Uri template for the sitemap summary resource.
pub const SITEMAP_DATA_TEMPLATE: &str = "data://sitemap/{url}";

/// Uri template for the sitemap updates resource.
pub const SITEMAP_UPDATES_TEMPLATE: &str = "data://sitemap/updates/{url}";

/// URLs included in the summary resource payload.
const SUMMARY_URL_SAMPLE: usize = 10;

/// Entries sampled in the updates resource payload.
const UPDATES_ENTRY_SAMPLE: usize = 10;

/// Recently updated URLs reported by the updates resource.
const UPDATES_RECENT_LIMIT: usize = 20;

/// Sitemap summary resource handler
pub struct SitemapDataHandler {
    client: Arc<SitemapClient>,
}

/// Sitemap update metadata resource handler
pub struct SitemapUpdatesHandler {
    client: Arc<SitemapClient>,
}

/// Extract the target sitemap url from a concrete resource uri.
fn target_url<'a>(uri: &'a str, prefix: &str) -> Result<&'a str> {
    let target = uri
        .strip_prefix(prefix)
        .ok_or_else(|| anyhow!("Resource uri does not match template: {}", uri))?;
    if target.is_empty() {
        return Err(anyhow!("Resource uri is missing the sitemap url: {}", uri));
    }
    Ok(target)
}

impl SitemapDataHandler {
    /// Create a new sitemap data handler
    #[inline]
    pub fn new(client: Arc<SitemapClient>) -> Self {
        Self { client }
    }

    /// Create the sitemap summary resource definition
    #[inline]
    pub fn resource_definition() -> Resource {
        Resource {
            uri: SITEMAP_DATA_TEMPLATE.to_string(),
            name: "Sitemap summary".to_string(),
            description: Some(
                "Type, URL count, and a URL sample for the sitemap at {url}".to_string(),
            ),
            mime_type: Some("application/json".to_string()),
        }
    }
}

#[async_trait]
impl ResourceHandler for SitemapDataHandler {
    #[inline]
    async fn handle(&self, uri: &str) -> Result<Value> {
        let url = target_url(uri, "data://sitemap/")?;

        debug!("Reading sitemap summary resource for {}", url);

        let (document, _) = self.client.fetch_document(url).await?;
        let urls = document.urls();
        let first_urls: Vec<&String> = urls.iter().take(SUMMARY_URL_SAMPLE).collect();

        Ok(json!({
            "source_url": url,
            "sitemap_type": document.kind,
            "total_urls": urls.len(),
            "first_10_urls": first_urls,
        }))
    }
}

impl SitemapUpdatesHandler {
    /// Create a new sitemap updates handler
    #[inline]
    pub fn new(client: Arc<SitemapClient>) -> Self {
        Self { client }
    }

    /// Create the sitemap updates resource definition
    #[inline]
    pub fn resource_definition() -> Resource {
        Resource {
            uri: SITEMAP_UPDATES_TEMPLATE.to_string(),
            name: "Sitemap update metadata".to_string(),
            description: Some(
                "Update frequency and recency metadata for the sitemap at {url}".to_string(),
            ),
            mime_type: Some("application/json".to_string()),
        }
    }
}

#[async_trait]
impl ResourceHandler for SitemapUpdatesHandler {
    #[inline]
    async fn handle(&self, uri: &str) -> Result<Value> {
        let url = target_url(uri, "data://sitemap/updates/")?;

        debug!("Reading sitemap updates resource for {}", url);

        let (document, _) = self.client.fetch_document(url).await?;
        let now = Utc::now();
        let patterns = analysis::analyze_update_patterns(&document.entries, now);
        let coverage = analysis::metadata_coverage(&document.entries);
        let recent = analysis::recent_updates(&document.entries, UPDATES_RECENT_LIMIT);
        let sample: Vec<_> = document.entries.iter().take(UPDATES_ENTRY_SAMPLE).collect();

        Ok(json!({
            "source_url": url,
            "analyzed_at": now.to_rfc3339(),
            "total_urls": document.entries.len(),
            "metadata_coverage": coverage,
            "update_patterns": patterns,
            "recent_updates": recent,
            "sample_entries": sample,
        }))
    }
}

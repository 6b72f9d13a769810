//! MCP Tools Implementation
//!
//! This module provides the tool registration and discovery system, along
//! with concrete tool implementations for the calculator and sitemap
//! analysis servers.

use crate::calculator::{self, Operation};
use crate::mcp::protocol::*;
use crate::mcp::server::ToolHandler;
use crate::sitemap::SitemapClient;
use crate::sitemap::analysis;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// How many recently updated URLs tool output reports.
const RECENT_UPDATES_LIMIT: usize = 20;

/// Default per-domain URL sample size for extract_domain_info.
const DEFAULT_DOMAIN_SAMPLE: usize = 10;

/// Arithmetic evaluation tool handler
pub struct CalculateHandler;

/// Sitemap fetch-and-parse tool handler
pub struct ParseSitemapHandler {
    client: Arc<SitemapClient>,
}

/// Sitemap URL pattern analysis tool handler
pub struct AnalyzeSitemapHandler {
    client: Arc<SitemapClient>,
}

/// Sitemap protocol-limit validation tool handler
pub struct ValidateSitemapHandler {
    client: Arc<SitemapClient>,
}

/// Per-domain sitemap breakdown tool handler
pub struct ExtractDomainInfoHandler {
    client: Arc<SitemapClient>,
}

/// Sitemap update-frequency analysis tool handler
pub struct AnalyzeUpdatePatternsHandler {
    client: Arc<SitemapClient>,
}

impl CalculateHandler {
    /// Create the calculate tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        let methods: Vec<&str> = Operation::ALL.iter().map(|op| op.name()).collect();
        Tool {
            name: "calculate".to_string(),
            description: Some(
                "Evaluate an arithmetic operation over a list of numbers".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "method": {
                        "type": "string",
                        "enum": methods,
                        "description": "Operation to perform"
                    },
                    "args": {
                        "type": "array",
                        "items": { "type": "number" },
                        "description": "Operands, applied left to right"
                    }
                },
                "required": ["method", "args"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for CalculateHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();

        let method = args
            .get("method")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing required parameter: method"))?;

        let operands: Vec<f64> = args
            .get("args")
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow!("Missing required parameter: args"))?
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| anyhow!("Argument is not a number: {}", v))
            })
            .collect::<Result<_>>()?;

        debug!("Calculating: method='{}', args={:?}", method, operands);

        match calculator::evaluate_named(method, &operands) {
            Ok(result) => {
                let response = json!({
                    "method": method,
                    "args": operands,
                    "result": result,
                });
                Ok(CallToolResult {
                    content: vec![ToolContent::Text {
                        text: serde_json::to_string_pretty(&response)?,
                    }],
                    is_error: Some(false),
                })
            }
            Err(e) => {
                error!("Calculation failed: {}", e);
                let response = json!({
                    "error": e.to_string(),
                    "method": method,
                    "args": operands,
                });
                Ok(CallToolResult {
                    content: vec![ToolContent::Text {
                        text: serde_json::to_string_pretty(&response)?,
                    }],
                    is_error: Some(true),
                })
            }
        }
    }
}

/// Read the required `url` argument from a tool call.
fn require_url(args: &HashMap<String, serde_json::Value>) -> Result<String> {
    args.get("url")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Missing required parameter: url"))
}

/// Uniform failure payload for sitemap tools. Fetch and parse failures are
/// reported in-band so the client sees the source url alongside the error.
fn sitemap_error(url: &str, error: &anyhow::Error) -> Result<CallToolResult> {
    error!("Sitemap tool failed for {}: {}", url, error);
    let response = json!({
        "success": false,
        "error": error.to_string(),
        "source_url": url,
    });
    Ok(CallToolResult {
        content: vec![ToolContent::Text {
            text: serde_json::to_string_pretty(&response)?,
        }],
        is_error: Some(true),
    })
}

/// Wrap a successful sitemap tool payload.
fn sitemap_success(response: &serde_json::Value) -> Result<CallToolResult> {
    Ok(CallToolResult {
        content: vec![ToolContent::Text {
            text: serde_json::to_string_pretty(response)?,
        }],
        is_error: Some(false),
    })
}

/// Schema shared by the sitemap tools that take only a url.
fn url_only_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "description": "Sitemap URL (http or https)"
            }
        },
        "required": ["url"],
        "additionalProperties": false
    })
}

impl ParseSitemapHandler {
    /// Create a new parse sitemap handler
    #[inline]
    pub fn new(client: Arc<SitemapClient>) -> Self {
        Self { client }
    }

    /// Create the parse_sitemap tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "parse_sitemap".to_string(),
            description: Some(
                "Fetch a sitemap and return its type and the URLs it lists".to_string(),
            ),
            input_schema: url_only_schema(),
        }
    }
}

#[async_trait]
impl ToolHandler for ParseSitemapHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();
        let url = require_url(&args)?;

        debug!("Parsing sitemap: {}", url);

        match self.client.fetch_document(&url).await {
            Ok((document, _)) => {
                let urls = document.urls();
                let response = json!({
                    "success": true,
                    "source_url": url,
                    "sitemap_type": document.kind,
                    "total_urls": urls.len(),
                    "urls": urls,
                });
                sitemap_success(&response)
            }
            Err(e) => sitemap_error(&url, &e),
        }
    }
}

impl AnalyzeSitemapHandler {
    /// Create a new analyze sitemap handler
    #[inline]
    pub fn new(client: Arc<SitemapClient>) -> Self {
        Self { client }
    }

    /// Create the analyze_sitemap tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "analyze_sitemap".to_string(),
            description: Some(
                "Analyze the domain, path, and file extension distribution of a sitemap"
                    .to_string(),
            ),
            input_schema: url_only_schema(),
        }
    }
}

#[async_trait]
impl ToolHandler for AnalyzeSitemapHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();
        let url = require_url(&args)?;

        debug!("Analyzing sitemap: {}", url);

        match self.client.fetch_document(&url).await {
            Ok((document, _)) => {
                let urls = document.urls();
                let patterns = analysis::analyze_url_patterns(&urls);
                let response = json!({
                    "success": true,
                    "source_url": url,
                    "sitemap_type": document.kind,
                    "url_patterns": patterns,
                });
                sitemap_success(&response)
            }
            Err(e) => sitemap_error(&url, &e),
        }
    }
}

impl ValidateSitemapHandler {
    /// Create a new validate sitemap handler
    #[inline]
    pub fn new(client: Arc<SitemapClient>) -> Self {
        Self { client }
    }

    /// Create the validate_sitemap tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "validate_sitemap".to_string(),
            description: Some(
                "Check a sitemap against the sitemap protocol limits".to_string(),
            ),
            input_schema: url_only_schema(),
        }
    }
}

#[async_trait]
impl ToolHandler for ValidateSitemapHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();
        let url = require_url(&args)?;

        debug!("Validating sitemap: {}", url);

        match self.client.fetch_document(&url).await {
            Ok((document, content_bytes)) => {
                let report = analysis::validate_sitemap(&document, content_bytes);
                let response = json!({
                    "success": true,
                    "source_url": url,
                    "validation": report,
                });
                sitemap_success(&response)
            }
            Err(e) => sitemap_error(&url, &e),
        }
    }
}

impl ExtractDomainInfoHandler {
    /// Create a new extract domain info handler
    #[inline]
    pub fn new(client: Arc<SitemapClient>) -> Self {
        Self { client }
    }

    /// Create the extract_domain_info tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "extract_domain_info".to_string(),
            description: Some(
                "Group a sitemap's URLs by domain with bounded samples".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Sitemap URL (http or https)"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Sample URLs to keep per domain (default: 10)"
                    }
                },
                "required": ["url"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for ExtractDomainInfoHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();
        let url = require_url(&args)?;

        let limit = args
            .get("limit")
            .and_then(|v| v.as_i64())
            .map_or(DEFAULT_DOMAIN_SAMPLE, |v| v.max(1) as usize);

        debug!("Extracting domain info: url='{}', limit={}", url, limit);

        match self.client.fetch_document(&url).await {
            Ok((document, _)) => {
                let urls = document.urls();
                let domains = analysis::domain_summary(&urls, limit);
                let response = json!({
                    "success": true,
                    "source_url": url,
                    "total_urls": urls.len(),
                    "total_domains": domains.len(),
                    "domains": domains,
                });
                sitemap_success(&response)
            }
            Err(e) => sitemap_error(&url, &e),
        }
    }
}

impl AnalyzeUpdatePatternsHandler {
    /// Create a new analyze update patterns handler
    #[inline]
    pub fn new(client: Arc<SitemapClient>) -> Self {
        Self { client }
    }

    /// Create the analyze_update_patterns tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "analyze_update_patterns".to_string(),
            description: Some(
                "Analyze lastmod, changefreq, and priority metadata of a sitemap".to_string(),
            ),
            input_schema: url_only_schema(),
        }
    }
}

#[async_trait]
impl ToolHandler for AnalyzeUpdatePatternsHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();
        let url = require_url(&args)?;

        debug!("Analyzing update patterns: {}", url);

        match self.client.fetch_document(&url).await {
            Ok((document, _)) => {
                let now = Utc::now();
                let patterns = analysis::analyze_update_patterns(&document.entries, now);
                let coverage = analysis::metadata_coverage(&document.entries);
                let recent = analysis::recent_updates(&document.entries, RECENT_UPDATES_LIMIT);
                let domains = analysis::domain_update_summary(&document.entries);
                let response = json!({
                    "success": true,
                    "source_url": url,
                    "analyzed_at": now.to_rfc3339(),
                    "sitemap_type": document.kind,
                    "total_urls": document.entries.len(),
                    "metadata_coverage": coverage,
                    "update_patterns": patterns,
                    "recent_updates": recent,
                    "domain_update_summary": domains,
                });
                sitemap_success(&response)
            }
            Err(e) => sitemap_error(&url, &e),
        }
    }
}

/// Tool registry for managing tool registration
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    /// Create a new tool registry
    #[inline]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool
    #[inline]
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all registered tools
    #[inline]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.values().cloned().collect()
    }

    /// Get a specific tool by name
    #[inline]
    pub fn get_tool(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Registry with the calculator server's tools
    #[inline]
    pub fn create_calculator() -> Self {
        let mut registry = Self::new();
        registry.register(CalculateHandler::tool_definition());
        registry
    }

    /// Registry with the sitemap server's tools
    #[inline]
    pub fn create_sitemap() -> Self {
        let mut registry = Self::new();

        registry.register(ParseSitemapHandler::tool_definition());
        registry.register(AnalyzeSitemapHandler::tool_definition());
        registry.register(ValidateSitemapHandler::tool_definition());
        registry.register(ExtractDomainInfoHandler::tool_definition());
        registry.register(AnalyzeUpdatePatternsHandler::tool_definition());

        registry
    }
}

impl Default for ToolRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

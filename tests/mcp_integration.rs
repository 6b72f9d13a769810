//! MCP server integration tests
//!
//! Exercises the public server API end to end: registration, health and
//! statistics reporting, tool execution, and prompt rendering.

use sitekit_mcp::config::FetchConfig;
use sitekit_mcp::mcp::prompts::{PromptKind, TemplatePromptHandler};
use sitekit_mcp::mcp::protocol::{CallToolParams, CallToolResult, ToolContent};
use sitekit_mcp::mcp::resources::{SitemapDataHandler, SitemapUpdatesHandler};
use sitekit_mcp::mcp::tools::{
    AnalyzeUpdatePatternsHandler, CalculateHandler, ParseSitemapHandler,
};
use sitekit_mcp::mcp::{ConnectionState, McpServer, ResourceHandler, ToolHandler};
use sitekit_mcp::sitemap::SitemapClient;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SAMPLE_SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
    <url>
        <loc>https://example.com/</loc>
        <lastmod>2024-01-01</lastmod>
        <changefreq>daily</changefreq>
        <priority>1.0</priority>
    </url>
    <url>
        <loc>https://example.com/about</loc>
        <lastmod>2024-01-02</lastmod>
        <changefreq>monthly</changefreq>
        <priority>0.8</priority>
    </url>
</urlset>"#;

fn fast_fetch_config() -> FetchConfig {
    FetchConfig {
        timeout_seconds: 5,
        max_retries: 0,
        retry_delay_seconds: 1,
        ..FetchConfig::default()
    }
}

fn tool_payload(result: &CallToolResult) -> Value {
    let ToolContent::Text { text } = &result.content[0] else {
        panic!("expected text content");
    };
    serde_json::from_str(text).expect("payload is json")
}

#[tokio::test]
async fn server_reports_health_and_statistics() {
    let server = McpServer::new("test".to_string(), "0.1.0".to_string()).expect("server builds");
    let server = Arc::new(server);

    let client = Arc::new(SitemapClient::new(fast_fetch_config()));

    server
        .register_tool(CalculateHandler::tool_definition(), CalculateHandler)
        .await
        .expect("tool registers");
    server
        .register_prompt(
            PromptKind::LearningPlan.definition(),
            TemplatePromptHandler::new(PromptKind::LearningPlan),
        )
        .await
        .expect("prompt registers");
    server
        .register_resource(
            SitemapDataHandler::resource_definition(),
            SitemapDataHandler::new(Arc::clone(&client)),
        )
        .await
        .expect("resource registers");
    server
        .register_resource(
            SitemapUpdatesHandler::resource_definition(),
            SitemapUpdatesHandler::new(client),
        )
        .await
        .expect("resource registers");

    let health = server.health_status().await;
    assert_eq!(health.connection_state, ConnectionState::Uninitialized);
    assert_eq!(health.tools_registered, 1);
    assert_eq!(health.prompts_registered, 1);
    assert_eq!(health.resources_registered, 2);

    let stats = server.server_statistics().await;
    assert_eq!(stats.server_info.name, "test");
    assert!(stats.registered_tools.contains(&"calculate".to_string()));
    assert!(
        stats
            .registered_prompts
            .contains(&"learning_plan".to_string())
    );
    assert!(
        stats
            .registered_resources
            .contains(&"data://sitemap/{url}".to_string())
    );
}

#[tokio::test]
async fn calculate_tool_end_to_end() {
    let mut arguments = HashMap::new();
    arguments.insert("method".to_string(), json!("subtract"));
    arguments.insert("args".to_string(), json!([10, 3, 2]));

    let result = CalculateHandler
        .handle(CallToolParams {
            name: "calculate".to_string(),
            arguments: Some(arguments),
        })
        .await
        .expect("handler succeeds");

    assert_eq!(result.is_error, Some(false));
    let payload = tool_payload(&result);
    assert_eq!(payload["result"], json!(5));
}

#[tokio::test(flavor = "multi_thread")]
async fn parse_sitemap_tool_fetches_and_parses() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_SITEMAP))
        .mount(&mock_server)
        .await;

    let client = Arc::new(SitemapClient::new(fast_fetch_config()));
    let handler = ParseSitemapHandler::new(client);

    let mut arguments = HashMap::new();
    arguments.insert(
        "url".to_string(),
        json!(format!("{}/sitemap.xml", mock_server.uri())),
    );

    let result = handler
        .handle(CallToolParams {
            name: "parse_sitemap".to_string(),
            arguments: Some(arguments),
        })
        .await
        .expect("handler succeeds");

    assert_eq!(result.is_error, Some(false));
    let payload = tool_payload(&result);
    assert_eq!(payload["sitemap_type"], json!("standard_sitemap"));
    assert_eq!(payload["total_urls"], json!(2));
    assert_eq!(payload["urls"][0], json!("https://example.com/"));
}

#[tokio::test(flavor = "multi_thread")]
async fn parse_sitemap_tool_reports_fetch_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = Arc::new(SitemapClient::new(fast_fetch_config()));
    let handler = ParseSitemapHandler::new(client);

    let mut arguments = HashMap::new();
    arguments.insert(
        "url".to_string(),
        json!(format!("{}/missing.xml", mock_server.uri())),
    );

    let result = handler
        .handle(CallToolParams {
            name: "parse_sitemap".to_string(),
            arguments: Some(arguments),
        })
        .await
        .expect("failure reported in-band");

    assert_eq!(result.is_error, Some(true));
    let payload = tool_payload(&result);
    assert_eq!(payload["success"], json!(false));
}

#[tokio::test(flavor = "multi_thread")]
async fn analyze_update_patterns_reports_domain_summary() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_SITEMAP))
        .mount(&mock_server)
        .await;

    let client = Arc::new(SitemapClient::new(fast_fetch_config()));
    let handler = AnalyzeUpdatePatternsHandler::new(client);

    let mut arguments = HashMap::new();
    arguments.insert(
        "url".to_string(),
        json!(format!("{}/sitemap.xml", mock_server.uri())),
    );

    let result = handler
        .handle(CallToolParams {
            name: "analyze_update_patterns".to_string(),
            arguments: Some(arguments),
        })
        .await
        .expect("handler succeeds");

    assert_eq!(result.is_error, Some(false));
    let payload = tool_payload(&result);
    assert_eq!(payload["sitemap_type"], json!("standard_sitemap"));

    let domains = payload["domain_update_summary"]
        .as_array()
        .expect("domain summary");
    assert_eq!(domains.len(), 1);
    assert_eq!(domains[0]["domain"], json!("example.com"));
    assert_eq!(domains[0]["count"], json!(2));
    let avg = domains[0]["avg_priority"].as_f64().expect("avg priority");
    assert!((avg - 0.9).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread")]
async fn sitemap_data_resource_returns_summary() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_SITEMAP))
        .mount(&mock_server)
        .await;

    let client = Arc::new(SitemapClient::new(fast_fetch_config()));
    let handler = SitemapDataHandler::new(client);

    let target = format!("{}/sitemap.xml", mock_server.uri());
    let uri = format!("data://sitemap/{}", target);

    let value = handler.handle(&uri).await.expect("resource reads");
    assert_eq!(value["total_urls"], json!(2));
    assert_eq!(value["sitemap_type"], json!("standard_sitemap"));
    assert_eq!(
        value["first_10_urls"]
            .as_array()
            .expect("url sample")
            .len(),
        2
    );
}

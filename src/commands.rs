use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use crate::calculator;
use crate::config::Config;
use crate::mcp::McpServer;
use crate::mcp::prompts::{PromptKind, TemplatePromptHandler};
use crate::mcp::resources::{SitemapDataHandler, SitemapUpdatesHandler};
use crate::mcp::tools::{
    AnalyzeSitemapHandler, AnalyzeUpdatePatternsHandler, CalculateHandler,
    ExtractDomainInfoHandler, ParseSitemapHandler, ValidateSitemapHandler,
};
use crate::sitemap::SitemapClient;

/// Which MCP server flavor to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ServerKind {
    /// Arithmetic evaluation tools
    Calculator,
    /// Prompt template library
    Prompts,
    /// Sitemap fetching and analysis
    Sitemap,
}

impl ServerKind {
    /// Server name advertised during initialization.
    #[inline]
    pub fn server_name(self) -> &'static str {
        match self {
            Self::Calculator => "sitekit-calculator",
            Self::Prompts => "sitekit-prompts",
            Self::Sitemap => "sitekit-sitemap",
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            Self::Calculator => {
                "Arithmetic evaluation server. Use the calculate tool with a method \
                 (add, subtract, multiply, divide, power, modulo) and a list of \
                 numeric arguments."
            }
            Self::Prompts => {
                "Prompt template server. Use prompts/list to discover the available \
                 templates and prompts/get to render one with arguments."
            }
            Self::Sitemap => {
                "Sitemap analysis server. Tools fetch a sitemap by URL and return \
                 parsed URLs, pattern analysis, protocol validation, per-domain \
                 breakdowns, and update metadata. Resources expose the same data \
                 under data://sitemap/{url} and data://sitemap/updates/{url}."
            }
        }
    }
}

/// Run one MCP server flavor on stdio until EOF or interrupt.
#[inline]
pub async fn serve(kind: ServerKind) -> Result<()> {
    info!("Starting {} MCP server", kind.server_name());

    let config = Config::load().context("Failed to load configuration")?;

    let server = McpServer::new(
        kind.server_name().to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    )
    .context("Failed to create MCP server")?
    .with_instructions(kind.instructions());
    let server = Arc::new(server);

    match kind {
        ServerKind::Calculator => register_calculator(&server).await?,
        ServerKind::Prompts => register_prompts(&server).await?,
        ServerKind::Sitemap => register_sitemap(&server, &config).await?,
    }

    let health = server.health_status().await;
    eprintln!(
        "{} ready on stdio: {} tools, {} prompts, {} resources",
        kind.server_name(),
        health.tools_registered,
        health.prompts_registered,
        health.resources_registered
    );
    eprintln!("Press Ctrl+C to stop the server");

    // Serve with bounded restarts on transport errors
    let mut restart_count = 0;
    const MAX_RESTARTS: u32 = 3;

    loop {
        tokio::select! {
            result = Arc::clone(&server).serve_stdio() => {
                match result {
                    Ok(()) => {
                        info!("MCP server stopped normally");
                        break;
                    }
                    Err(e) => {
                        error!("MCP server error (attempt {}/{}): {}", restart_count + 1, MAX_RESTARTS + 1, e);
                        restart_count += 1;

                        if restart_count > MAX_RESTARTS {
                            error!("Maximum restart attempts reached, shutting down");
                            break;
                        }

                        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                        info!("Restarting MCP server (attempt {}/{})", restart_count + 1, MAX_RESTARTS + 1);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received interrupt signal, shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn register_calculator(server: &Arc<McpServer>) -> Result<()> {
    server
        .register_tool(CalculateHandler::tool_definition(), CalculateHandler)
        .await
        .context("Failed to register calculate tool")?;
    Ok(())
}

async fn register_prompts(server: &Arc<McpServer>) -> Result<()> {
    for kind in PromptKind::ALL {
        server
            .register_prompt(kind.definition(), TemplatePromptHandler::new(kind))
            .await
            .with_context(|| format!("Failed to register prompt {}", kind.name()))?;
    }
    Ok(())
}

async fn register_sitemap(server: &Arc<McpServer>, config: &Config) -> Result<()> {
    let client = Arc::new(SitemapClient::new(config.fetch.clone()));

    server
        .register_tool(
            ParseSitemapHandler::tool_definition(),
            ParseSitemapHandler::new(Arc::clone(&client)),
        )
        .await
        .context("Failed to register parse_sitemap tool")?;

    server
        .register_tool(
            AnalyzeSitemapHandler::tool_definition(),
            AnalyzeSitemapHandler::new(Arc::clone(&client)),
        )
        .await
        .context("Failed to register analyze_sitemap tool")?;

    server
        .register_tool(
            ValidateSitemapHandler::tool_definition(),
            ValidateSitemapHandler::new(Arc::clone(&client)),
        )
        .await
        .context("Failed to register validate_sitemap tool")?;

    server
        .register_tool(
            ExtractDomainInfoHandler::tool_definition(),
            ExtractDomainInfoHandler::new(Arc::clone(&client)),
        )
        .await
        .context("Failed to register extract_domain_info tool")?;

    server
        .register_tool(
            AnalyzeUpdatePatternsHandler::tool_definition(),
            AnalyzeUpdatePatternsHandler::new(Arc::clone(&client)),
        )
        .await
        .context("Failed to register analyze_update_patterns tool")?;

    server
        .register_resource(
            SitemapDataHandler::resource_definition(),
            SitemapDataHandler::new(Arc::clone(&client)),
        )
        .await
        .context("Failed to register sitemap data resource")?;

    server
        .register_resource(
            SitemapUpdatesHandler::resource_definition(),
            SitemapUpdatesHandler::new(Arc::clone(&client)),
        )
        .await
        .context("Failed to register sitemap updates resource")?;

    Ok(())
}

/// Evaluate an arithmetic operation directly, without the MCP transport.
#[inline]
pub fn eval(method: &str, args: &[f64]) -> Result<()> {
    let result = calculator::evaluate_named(method, args)?;
    println!("{}", result);
    Ok(())
}

//! Promptbook MCP server binary.
//!
//! Exposes prompt books to MCP clients (Claude Code, Gemini CLI, opencode).
//!
//! Usage:
//!   cargo run -p promptbook-mcp
//!
//!   # Use a specific registry file
//!   cargo run -p promptbook-mcp -- --config ./books.json
//!
//! Test with MCP inspector:
//!   npx @modelcontextprotocol/inspector cargo run -p promptbook-mcp

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::{EnvFilter, fmt};

use promptbook_mcp::PromptBookMcp;
use promptbook_mcp::config::BookRegistry;

/// MCP server for Notion-backed prompt books.
#[derive(Parser, Debug)]
#[command(name = "promptbook-mcp")]
#[command(about = "MCP server for Notion-backed prompt books")]
struct Args {
    /// Path to the book registry (defaults to $PROMPTBOOK_CONFIG or the
    /// user config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing to stderr (MCP uses stdio for protocol)
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(BookRegistry::default_path);
    tracing::info!(config = %config_path.display(), "starting promptbook MCP server");

    let mcp = PromptBookMcp::new(config_path);
    let service = mcp.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}

//! # drywall-mcp
//!
//! MCP server for DRYwall - code-duplication detection backed by jscpd.
//! One tool, `detect_code_duplication`: merge project config with per-call
//! options, run jscpd, and return the highest-impact clones first.
//!
//! ## Usage
//!
//! ```bash
//! # Standalone (stdio transport)
//! drywall-mcp
//! ```
//!
//! Project defaults live in an optional `.drywallrc.json` in the working
//! directory; per-call `options` override them.

use std::panic;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerInfo};
use rmcp::{ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use drywall::args::{build_args, resolve_scan_path};
use drywall::config::DrywallConfig;
use drywall::report::{ReduceLimits, Reduction, reduce_report};
use drywall::runner::{DEFAULT_JSCPD_VERSION, DEFAULT_TIMEOUT, REPORT_FILE_NAME, run_jscpd};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "drywall-mcp")]
#[command(about = "MCP server for jscpd code-duplication detection")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

// ============================================================================
// Tool Parameter Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct DetectParams {
    /// Directory to scan. Defaults to the config `path`, else the current
    /// working directory.
    #[serde(default)]
    path: Option<String>,
    /// jscpd options passed as CLI flags. Keys are camelCase and converted
    /// to --kebab-case flags. Examples: {"minTokens": 30, "minLines": 5,
    /// "ignore": ["**/test/**"], "format": ["javascript", "typescript"],
    /// "threshold": 10}. See https://jscpd.dev for all options.
    #[serde(default)]
    options: Option<Map<String, Value>>,
}

// ============================================================================
// Server
// ============================================================================

#[derive(Clone)]
struct DrywallServer {
    /// Tool router (generated by macro)
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

impl DrywallServer {
    fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    /// One full detection run: config -> args -> jscpd -> reduced report.
    /// The report lands in a per-call temp dir, so concurrent calls cannot
    /// read each other's output.
    async fn run_detection(&self, params: DetectParams) -> Result<Reduction> {
        let config = DrywallConfig::load(Path::new("."));
        let version = config
            .jscpd_version()
            .unwrap_or(DEFAULT_JSCPD_VERSION)
            .to_string();

        let report_dir = tempfile::tempdir().context("failed to create report directory")?;

        let options = params.options.unwrap_or_default();
        let mut args = build_args(&config, &options, report_dir.path());

        // The scan path goes last (positional, not a flag)
        args.push(resolve_scan_path(params.path.as_deref(), &config).to_string());

        run_jscpd(&version, &args, DEFAULT_TIMEOUT).await?;

        let report_path = report_dir.path().join(REPORT_FILE_NAME);
        let raw = tokio::fs::read_to_string(&report_path)
            .await
            .with_context(|| format!("failed to read jscpd report at {}", report_path.display()))?;

        let limits = ReduceLimits {
            max_duplicates: config.max_duplicates(),
            max_fragment_length: config.max_fragment_length(),
        };
        reduce_report(&raw, limits).context("failed to parse jscpd report")
    }
}

// ============================================================================
// MCP Tool Implementation
// ============================================================================

#[tool_router]
impl DrywallServer {
    /// Run jscpd and return ranked duplication findings
    #[tool(
        name = "detect_code_duplication",
        description = "Scan the codebase for duplicated code blocks using jscpd. Use this when the user asks about refactoring, deduplication, code consolidation, or reducing repetition in their codebase."
    )]
    async fn detect_code_duplication(
        &self,
        Parameters(params): Parameters<DetectParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        match self.run_detection(params).await {
            Ok(result) => {
                let body = serde_json::json!({
                    "status": "ok",
                    "summary": result.summary,
                    "duplicates": result.duplicates,
                });
                let text = serde_json::to_string_pretty(&body)
                    .unwrap_or_else(|e| format!("Serialization error: {}", e));
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => {
                let body = serde_json::json!({
                    "status": "error",
                    "message": format!("{:#}", e),
                });
                Ok(CallToolResult::error(vec![Content::text(body.to_string())]))
            }
        }
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler(router = self.tool_router)]
impl ServerHandler for DrywallServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: rmcp::model::ServerCapabilities {
                tools: Some(rmcp::model::ToolsCapability::default()),
                ..Default::default()
            },
            server_info: rmcp::model::Implementation {
                name: "drywall".to_string(),
                title: Some("DRYwall MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: Some("https://github.com/drywall-sh/drywall".to_string()),
            },
            instructions: Some(
                "detect_code_duplication(path, options) scans a directory with jscpd and \
                 returns a summary plus the highest-impact duplicate pairs.\n\n\
                 - path: directory to scan (default: current directory, or the 'path' key \
                 of .drywallrc.json)\n\
                 - options: camelCase jscpd flags, e.g. {\"minTokens\": 30, \
                 \"ignore\": [\"**/test/**\"]}\n\n\
                 Project defaults come from .drywallrc.json; per-call options override them."
                    .into(),
            ),
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Install custom panic hook that logs to stderr and exits cleanly.
/// This handles the "broken pipe" panic from rmcp when the client disconnects.
fn install_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        if msg.contains("Broken pipe") || msg.contains("os error 32") {
            eprintln!("[drywall-mcp] Client disconnected (broken pipe), shutting down");
        } else {
            let location = panic_info
                .location()
                .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
                .unwrap_or_default();
            eprintln!("[drywall-mcp] Panic{}: {}", location, msg);
        }

        std::process::exit(1);
    }));
}

/// Ignore SIGPIPE at the OS level so a closed pipe fails the write with
/// EPIPE instead of terminating the process.
#[cfg(unix)]
fn ignore_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }
}

#[cfg(not(unix))]
fn ignore_sigpipe() {
    // No-op on non-Unix platforms
}

async fn run_server() -> Result<()> {
    let args = Args::parse();

    // Initialize logging - MUST write to stderr, stdout is for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap_or_default()),
        )
        .init();

    info!("Starting drywall-mcp v{}", env!("CARGO_PKG_VERSION"));

    let server = DrywallServer::new();

    info!("Server ready. Listening on stdio...");

    server
        .serve(rmcp::transport::stdio())
        .await?
        .waiting()
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    ignore_sigpipe();
    install_panic_hook();

    match run_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let err_str = format!("{:?}", e);
            if err_str.contains("Broken pipe") || err_str.contains("os error 32") {
                eprintln!("[drywall-mcp] Client disconnected, shutting down");
                ExitCode::SUCCESS
            } else {
                eprintln!("[drywall-mcp] Error: {:#}", e);
                ExitCode::FAILURE
            }
        }
    }
}

//! # nesram - live 8-bit game RAM, decoded
//!
//! The main binary for the nesram memory catalog codec.
//!
//! This application provides:
//! - HTTP REST API server (axum-based) for bots and LLM tool calls
//! - CLI interface for reads, writes, party reordering, and bestiary lookups
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   apps/nesram (THE BINARY)                  │
//! │                                                             │
//! │    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    │
//! │    │    CLI      │    │  HTTP API   │    │   Config    │    │
//! │    │   (clap)    │    │   (axum)    │    │ (toml, env) │    │
//! │    └──────┬──────┘    └──────┬──────┘    └──────┬──────┘    │
//! │           └──────────────────┼──────────────────┘           │
//! │                              ▼                              │
//! │                     ┌─────────────────┐                     │
//! │                     │   nesram-core   │                     │
//! │                     │   (THE CODEC)   │                     │
//! │                     └────────┬────────┘                     │
//! └──────────────────────────────┼──────────────────────────────┘
//!                                ▼
//!          ram_catalog.json   ram_contents.json   bestiary.json
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! nesram server --host 0.0.0.0 --port 5000
//!
//! # CLI operations
//! nesram read 0x00610A 0x006102
//! nesram write '{"0x00610A": 50}'
//! nesram order 2 1 3 4
//! nesram locations Goblins Cerebus
//! ```

use clap::Parser;
use nesram::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing. NESRAM_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("NESRAM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nesram=info,tower_http=debug".into());

    // Logs go to stderr so --json-mode output stays parseable
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the nesram startup banner.
fn print_banner() {
    println!(
        r#"
  ███╗   ██╗███████╗███████╗██████╗  █████╗ ███╗   ███╗
  ████╗  ██║██╔════╝██╔════╝██╔══██╗██╔══██╗████╗ ████║
  ██╔██╗ ██║█████╗  ███████╗██████╔╝███████║██╔████╔██║
  ██║╚██╗██║██╔══╝  ╚════██║██╔══██╗██╔══██║██║╚██╔╝██║
  ██║ ╚████║███████╗███████║██║  ██║██║  ██║██║ ╚═╝ ██║
  ╚═╝  ╚═══╝╚══════╝╚══════╝╚═╝  ╚═╝╚═╝  ╚═╝╚═╝     ╚═╝

  Memory Catalog Codec v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}

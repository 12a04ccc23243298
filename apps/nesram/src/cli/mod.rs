//! # nesram CLI Module
//!
//! This module implements the CLI interface for nesram.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `read` - Decode catalogued addresses
//! - `write` - Encode and persist values from JSON
//! - `order` - Rearrange the party stat blocks
//! - `names` - Show the four party names
//! - `monsters` - Monsters found at a location
//! - `locations` - Locations where monsters appear
//! - `enemies` - Hex dump of the battle enemy region
//! - `catalog` - List catalogued addresses

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use nesram_core::{CodecError, RamService};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// nesram - live 8-bit game RAM, decoded
///
/// Reads and writes the emulator's RAM snapshot through a declarative
/// memory catalog.
#[derive(Parser, Debug)]
#[command(name = "nesram")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Ramdisk directory holding the catalog, snapshot, and bestiary
    #[arg(short = 'R', long, global = true)]
    pub ramdisk: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Decode catalogued addresses (e.g. 0x00610A)
    Read {
        /// Addresses in 0xNNNNNN form
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Encode and write values given as JSON ("-" reads stdin)
    Write {
        /// `{"0x00610A": 50}` or `[{"0x00610A": 50}, ...]`
        payload: String,
    },

    /// Rearrange the party: slot N receives the block of the Nth argument
    Order {
        /// Four source slots, a permutation of 1 2 3 4
        #[arg(num_args = 4, required = true, allow_negative_numbers = true)]
        slots: Vec<i64>,
    },

    /// Show the four party names
    Names,

    /// Monsters found at a location
    Monsters {
        /// Exact location name
        location: String,
    },

    /// Locations where monsters appear
    Locations {
        /// Monster names, plural or singular
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Hex dump of the battle enemy region
    Enemies,

    /// List catalogued addresses
    Catalog,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve configuration: defaults, config file, environment, then CLI flags.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig, CodecError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.ramdisk {
        config.ramdisk_dir = dir.clone();
    }
    Ok(config)
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CodecError> {
    let mut config = resolve_config(&cli)?;
    let json_mode = cli.json_mode;

    if cli.verbose {
        print_paths(&config);
    }

    // Server flags override the resolved config before the service is built
    if let Some(Commands::Server { host, port }) = &cli.command {
        if let Some(host) = host {
            config.host = host.clone();
        }
        if let Some(port) = port {
            config.port = *port;
        }
    }

    let service = RamService::new(config.data_paths());

    match cli.command {
        Some(Commands::Server { .. }) | None => cmd_server(&config, service).await,
        Some(Commands::Read { addresses }) => cmd_read(&service, json_mode, &addresses),
        Some(Commands::Write { payload }) => cmd_write(&service, json_mode, &payload),
        Some(Commands::Order { slots }) => cmd_order(&service, json_mode, &slots),
        Some(Commands::Names) => cmd_names(&service, json_mode),
        Some(Commands::Monsters { location }) => cmd_monsters(&service, json_mode, &location),
        Some(Commands::Locations { names }) => cmd_locations(&service, json_mode, &names),
        Some(Commands::Enemies) => cmd_enemies(&service, json_mode),
        Some(Commands::Catalog) => cmd_catalog(&service, json_mode),
    }
}

//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::AppConfig;
use nesram_core::{CodecError, Permutation, RamService};
use serde::Serialize;
use std::io::Read;

/// Print a value as pretty JSON.
fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

/// Print the resolved data file locations.
pub fn print_paths(config: &AppConfig) {
    let paths = config.data_paths();
    println!("Catalog:  {}", paths.catalog.display());
    println!("Snapshot: {}", paths.snapshot.display());
    println!("Bestiary: {}", paths.bestiary.display());
    println!();
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &AppConfig, service: RamService) -> Result<(), CodecError> {
    println!("nesram Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:    {}", config.host);
    println!("  Port:    {}", config.port);
    println!("  Ramdisk: {}", config.ramdisk_dir.display());
    println!();
    println!("Endpoints:");
    println!("  POST /nes/read                - Decode addresses");
    println!("  POST /nes/write               - Write values");
    println!("  POST /nes/order               - Reorder the party");
    println!("  POST /nes/names/get           - Party names");
    println!("  POST /nes/bestiary/monsters   - Monsters at a location");
    println!("  POST /nes/bestiary/locations  - Locations of monsters");
    println!("  GET  /nes/catalog             - Catalog listing");
    println!("  GET  /health                  - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&config.bind_addr(), service, config.cors_origins.as_deref()).await
}

// =============================================================================
// READ / WRITE COMMANDS
// =============================================================================

/// Decode addresses and print their values.
pub fn cmd_read(
    service: &RamService,
    json_mode: bool,
    addresses: &[String],
) -> Result<(), CodecError> {
    let values = service.read(addresses)?;

    if json_mode {
        print_json(&serde_json::json!({ "addresses": values }));
        return Ok(());
    }

    for (address, value) in &values {
        println!("{}  {:?}", address, value);
    }
    Ok(())
}

/// Encode and persist values from a JSON payload.
pub fn cmd_write(service: &RamService, json_mode: bool, payload: &str) -> Result<(), CodecError> {
    let text = if payload == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CodecError::Io(format!("stdin: {}", e)))?;
        buf
    } else {
        payload.to_string()
    };

    let body: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| CodecError::InvalidRequest(format!("payload is not JSON: {}", e)))?;
    let values = api::write_values(&body)?;
    let receipt = service.write(&values)?;

    if json_mode {
        print_json(&receipt);
    } else {
        println!("Wrote {} addresses", receipt.written);
    }
    Ok(())
}

// =============================================================================
// PARTY COMMANDS
// =============================================================================

/// Rearrange the party stat blocks.
pub fn cmd_order(service: &RamService, json_mode: bool, slots: &[i64]) -> Result<(), CodecError> {
    let permutation = Permutation::new(slots)?;
    let receipt = service.reorder(&permutation)?;

    if json_mode {
        print_json(&serde_json::json!({
            "order": permutation.sources(),
            "written": receipt.written
        }));
        return Ok(());
    }

    if permutation.is_identity() {
        println!("Party order unchanged");
    } else {
        println!("Party reordered to {:?}", permutation.sources());
    }
    Ok(())
}

/// Show the four party names.
pub fn cmd_names(service: &RamService, json_mode: bool) -> Result<(), CodecError> {
    let names = service.character_names()?;

    if json_mode {
        print_json(&names);
        return Ok(());
    }

    for (slot, name) in names.as_array().iter().enumerate() {
        println!("Slot {}: {}", slot + 1, name);
    }
    Ok(())
}

// =============================================================================
// BESTIARY COMMANDS
// =============================================================================

/// Monsters found at a location.
pub fn cmd_monsters(service: &RamService, json_mode: bool, location: &str) -> Result<(), CodecError> {
    let monsters = service.monsters_at(location)?;

    if json_mode {
        print_json(&serde_json::json!({ "monsters": monsters }));
        return Ok(());
    }

    println!("{}:", location);
    for monster in &monsters {
        println!("  {}", monster);
    }
    Ok(())
}

/// Locations where monsters appear.
pub fn cmd_locations(
    service: &RamService,
    json_mode: bool,
    names: &[String],
) -> Result<(), CodecError> {
    let query: Vec<serde_json::Value> = names.iter().map(|n| serde_json::json!(n)).collect();
    let locations = service.locations_of(&query)?;

    if json_mode {
        print_json(&serde_json::json!({ "locations": locations }));
        return Ok(());
    }

    for (name, places) in &locations {
        println!("{}:", name);
        for place in places {
            println!("  {}", place);
        }
    }
    Ok(())
}

// =============================================================================
// DEBUG COMMANDS
// =============================================================================

/// Hex dump of the battle enemy region.
pub fn cmd_enemies(service: &RamService, json_mode: bool) -> Result<(), CodecError> {
    let rows = service.enemy_dump()?;

    if json_mode {
        print_json(&serde_json::json!({ "rows": rows }));
        return Ok(());
    }

    for row in &rows {
        println!("{}", row);
    }
    Ok(())
}

/// List catalogued addresses.
pub fn cmd_catalog(service: &RamService, json_mode: bool) -> Result<(), CodecError> {
    let entries = service.catalog_entries()?;

    if json_mode {
        print_json(&entries);
        return Ok(());
    }

    println!("nesram Catalog ({} entries)", entries.len());
    println!("==========================");
    for entry in &entries {
        let rule = match (&entry.weight, &entry.lookup) {
            (Some(weight), _) => format!("number x{}", weight),
            (_, Some(table)) => format!("lookup {}", table),
            _ => entry.kind.clone(),
        };
        println!("{}  {:<16}  {}", entry.address, rule, entry.description);
    }
    Ok(())
}

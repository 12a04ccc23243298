//! # nesram-core
//!
//! The Memory Catalog Codec for nesram - THE CODEC.
//!
//! This crate bridges a live 8-bit game's raw memory snapshot (an address to
//! hex-byte-string JSON map) and values a human or a language model can use.
//! A declarative catalog says how to interpret each known address; everything
//! else is built on top of it:
//!
//! - `decoder` / `encoder` → read and write values through catalog rules
//! - `bestiary` → location and monster reverse index
//! - `reorder` → permutation-validated copy of the party stat blocks
//! - `composite` → multi-address strings such as character names
//! - `service` → the application root owning paths and caches
//!
//! ## Architectural Constraints
//!
//! The codec:
//! - Never talks to the game; it only reads and writes the files it is given
//! - Never infers catalog content; the catalog is fully explicit
//! - Fails closed on malformed catalog or memory data
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod bestiary;
pub mod catalog;
pub mod composite;
pub mod decoder;
pub mod dump;
pub mod encoder;
pub mod files;
pub mod layout;
pub mod primitives;
pub mod reorder;
pub mod service;
pub mod snapshot;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{AddressKey, CodecError, ErrorClass, RawByte};

// =============================================================================
// RE-EXPORTS: Codec
// =============================================================================

pub use bestiary::Bestiary;
pub use catalog::{Catalog, CatalogEntry, EntrySummary, LookupTable, Rule};
pub use composite::{CharacterNames, character_names, compose_groups};
pub use decoder::{DecodedValues, Decoder};
pub use dump::enemy_dump;
pub use encoder::{EncodedWrites, WriteReceipt, WriteValue, encode};
pub use reorder::{Permutation, stage_reorder};
pub use service::{DataPaths, RamService};
pub use snapshot::{Snapshot, SnapshotStore};

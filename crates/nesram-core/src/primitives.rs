//! # Codec Primitives
//!
//! Hardcoded runtime constants for the nesram codec.
//!
//! These are compiled into the binary and are immutable at runtime. Address
//! layouts live in [`crate::layout`]; this module holds file names, sentinel
//! strings, and input limits.

// =============================================================================
// DATA FILES
// =============================================================================

/// File name of the catalog inside the ramdisk directory.
pub const CATALOG_FILE: &str = "ram_catalog.json";

/// File name of the memory snapshot inside the ramdisk directory.
pub const SNAPSHOT_FILE: &str = "ram_contents.json";

/// File name of the bestiary inside the ramdisk directory.
pub const BESTIARY_FILE: &str = "bestiary.json";

/// Default ramdisk directory when none is configured.
pub const DEFAULT_RAMDISK_DIR: &str = "/tmp/ramdisk/";

// =============================================================================
// DECODE TOKENS
// =============================================================================

/// Decoded enemy type that shares its code with "no enemy".
///
/// Enemy code `0x00` is the Imp, and empty enemy slots are also all zeroes,
/// so this token needs the companion exists flag to be trusted.
pub const IMP_TOKEN: &str = "Imp";

// =============================================================================
// BESTIARY SENTINELS
// =============================================================================

/// Returned for a location with no bestiary entry.
pub const NO_MONSTERS_HERE: &str = "no monsters here";

/// Returned for a monster that appears nowhere in the bestiary.
pub const MONSTER_NOT_FOUND: &str = "monster not found";

/// Normalized monster names whose trailing `s` is not a plural.
pub const SINGULAR_EXCEPTIONS: [&str; 2] = ["cerebus", "chaos"];

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of addresses in a single read or write request.
///
/// The whole 2 KiB work RAM plus cartridge RAM fits well below this.
pub const MAX_REQUEST_ADDRESSES: usize = 16384;

/// Maximum number of names in a single bestiary location query.
pub const MAX_MONSTER_QUERY: usize = 256;

/// Maximum size of any data file read from the ramdisk (64 MB).
///
/// Checked before reading so a runaway producer cannot exhaust memory.
pub const MAX_DATA_FILE_SIZE: u64 = 64 * 1024 * 1024;

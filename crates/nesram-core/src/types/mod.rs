//! # Core Type Definitions
//!
//! This module contains the validated value types shared by every component:
//! - Memory identifiers (`AddressKey`, `RawByte`)
//! - Error types (`CodecError`, `ErrorClass`)
//!
//! ## Validation Guarantees
//!
//! `AddressKey` and `RawByte` can only be built through their parsers, so any
//! value of these types already has canonical form. Format errors surface where
//! the text enters the system (catalog load, request parsing), not deep inside
//! a decode.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// ADDRESS KEY
// =============================================================================

/// Number of hex digits in a canonical address key.
pub const ADDRESS_DIGITS: usize = 6;

/// Largest address representable by a six-digit key.
pub const MAX_ADDRESS: u32 = 0x00FF_FFFF;

/// A memory address in canonical `0xNNNNNN` form (six uppercase hex digits).
///
/// Parsing is exact: `"0x6BE4"` or `"0x006be4"` are rejected rather than
/// coerced, because catalog and snapshot keys are matched as exact strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressKey(u32);

impl AddressKey {
    /// Build a key from a numeric address.
    ///
    /// Returns `None` if the address does not fit in six hex digits.
    #[must_use]
    pub const fn new(address: u32) -> Option<Self> {
        if address > MAX_ADDRESS {
            None
        } else {
            Some(Self(address))
        }
    }

    /// Build a key from a 16-bit address. Always in range.
    #[must_use]
    pub const fn from_u16(address: u16) -> Self {
        Self(address as u32)
    }

    /// Get the numeric address.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Key for the address `delta` bytes after this one.
    #[must_use]
    pub const fn offset(self, delta: u32) -> Option<Self> {
        match self.0.checked_add(delta) {
            Some(address) => Self::new(address),
            None => None,
        }
    }

    /// Parse a key, requiring canonical form.
    pub fn parse(s: &str) -> Result<Self, CodecError> {
        let invalid = || CodecError::InvalidAddress(s.to_string());

        let digits = s.strip_prefix("0x").ok_or_else(invalid)?;
        if digits.len() != ADDRESS_DIGITS
            || !digits
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
        {
            return Err(invalid());
        }

        u32::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06X}", self.0)
    }
}

impl FromStr for AddressKey {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AddressKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AddressKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// RAW BYTE
// =============================================================================

/// One byte of emulator memory as exported in a snapshot (`"0x05"`).
///
/// Two hex digits after a `0x` prefix. Hex digit case is accepted either way
/// and compared by value; the canonical rendering is uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RawByte(pub u8);

impl RawByte {
    /// The zero byte, `"0x00"`.
    pub const ZERO: Self = Self(0);

    /// Get the byte value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Check whether this is the zero byte.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse a `0xNN` byte string.
    pub fn parse(s: &str) -> Result<Self, CodecError> {
        let invalid = || CodecError::InvalidRawByte(s.to_string());

        let digits = s.strip_prefix("0x").ok_or_else(invalid)?;
        if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        u8::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for RawByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

impl FromStr for RawByte {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for RawByte {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RawByte {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Who is at fault when an operation fails.
///
/// Lookup misses are not represented here: they resolve to a default or a
/// sentinel value and never become errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input from the caller. Reported immediately, never retried.
    Caller,
    /// Corrupt or missing data files. Fatal for the operation.
    DataIntegrity,
}

/// Errors that can occur in the codec.
///
/// - No silent failures
/// - Use `Result<T, CodecError>` for fallible operations
/// - The codec never panics; corrupt data is reported, not defaulted
#[derive(Debug, Error)]
pub enum CodecError {
    // -------------------------------------------------------------------------
    // Caller errors
    // -------------------------------------------------------------------------
    /// One or more requested addresses are not in the catalog.
    #[error("Requested RAM addresses not found in catalog: {}", join_display(missing))]
    UnknownAddress { missing: Vec<String> },

    /// An address string is not in canonical `0xNNNNNN` form.
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    /// A byte string is not in `0xNN` form.
    #[error("Invalid raw byte: {0:?}")]
    InvalidRawByte(String),

    /// Reorder slots are not a permutation of 1..=4.
    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    /// A write value cannot be interpreted for its target address.
    #[error("Invalid value for {address}: {reason}")]
    InvalidValue { address: AddressKey, reason: String },

    /// A number is not a whole multiple of the target's weight.
    #[error("Value {value} for {address} is not a multiple of weight {weight}")]
    PrecisionLoss {
        address: AddressKey,
        value: i64,
        weight: u32,
    },

    /// A number does not fit in one byte after division by its weight.
    #[error("Value {value} for {address} is out of range (max {max})")]
    ValueOutOfRange {
        address: AddressKey,
        value: i64,
        max: i64,
    },

    /// A result string maps back to more than one raw byte.
    #[error("Value {value:?} for {address} matches several raw bytes: {}", join_display(candidates))]
    AmbiguousReverseLookup {
        address: AddressKey,
        value: String,
        candidates: Vec<RawByte>,
    },

    /// A result string has no raw byte in the lookup table.
    #[error("Value {value:?} for {address} has no raw byte in lookup table {table:?}")]
    NoReverseMapping {
        address: AddressKey,
        value: String,
        table: String,
    },

    /// The request body has the wrong shape.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // -------------------------------------------------------------------------
    // Data integrity errors
    // -------------------------------------------------------------------------
    /// The catalog file is absent or unparsable.
    #[error("Error loading catalog {path}: {reason}")]
    CatalogLoad { path: String, reason: String },

    /// A catalog entry or lookup table is malformed.
    #[error("RAM catalog entry has unexpected format: {0}")]
    CatalogSchema(String),

    /// The snapshot file is absent or unparsable.
    #[error("Error loading snapshot {path}: {reason}")]
    SnapshotLoad { path: String, reason: String },

    /// The bestiary file is absent or unparsable.
    #[error("Error loading bestiary {path}: {reason}")]
    BestiaryLoad { path: String, reason: String },

    /// A snapshot byte string failed to parse.
    #[error("Game memory not in expected format at {address}: {raw:?}")]
    MalformedMemory { address: AddressKey, raw: String },

    /// A catalogued address is absent from the snapshot.
    #[error("Game memory has no value for catalogued address {0}")]
    MissingSnapshotAddress(AddressKey),

    /// A stat block source address is absent from the snapshot.
    #[error("Missing expected RAM address in snapshot: {0}")]
    MissingSourceAddress(AddressKey),

    /// The fixed party layout is inconsistent.
    #[error("Internal address layout mismatch: {0}")]
    BlockLayout(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CodecError {
    /// Classify this error per the caller / data-integrity split.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownAddress { .. }
            | Self::InvalidAddress(_)
            | Self::InvalidRawByte(_)
            | Self::InvalidPermutation(_)
            | Self::InvalidValue { .. }
            | Self::PrecisionLoss { .. }
            | Self::ValueOutOfRange { .. }
            | Self::AmbiguousReverseLookup { .. }
            | Self::NoReverseMapping { .. }
            | Self::InvalidRequest(_) => ErrorClass::Caller,
            Self::CatalogLoad { .. }
            | Self::CatalogSchema(_)
            | Self::SnapshotLoad { .. }
            | Self::BestiaryLoad { .. }
            | Self::MalformedMemory { .. }
            | Self::MissingSnapshotAddress(_)
            | Self::MissingSourceAddress(_)
            | Self::BlockLayout(_)
            | Self::Io(_)
            | Self::Serialization(_) => ErrorClass::DataIntegrity,
        }
    }

    /// HTTP-style status code: 400 for caller errors, 500 otherwise.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.class() {
            ErrorClass::Caller => 400,
            ErrorClass::DataIntegrity => 500,
        }
    }

    /// Check if this error is the caller's fault.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        self.class() == ErrorClass::Caller
    }
}

fn join_display<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// TESTS
// =============================================================================

//! # Value Encoder
//!
//! The write path: turns caller values back into validated raw bytes using the
//! same catalog rules the decoder applies.
//!
//! Encoding policy:
//! - Number rule: the value must be a non-negative whole multiple of the
//!   weight, and the quotient must fit in one byte. Nothing is rounded.
//! - Lookup rule: the value is reverse-looked-up by exact result string.
//!   Exactly one matching raw byte is required; the table default is not
//!   reversible.
//! - Either rule accepts a raw `0xNN` string, written verbatim.
//!
//! Unknown addresses are all reported together; after that the first field
//! that fails to encode aborts the whole batch and nothing is written.

use crate::catalog::{CatalogEntry, Rule};
use crate::primitives::MAX_REQUEST_ADDRESSES;
use crate::{AddressKey, Catalog, CodecError, RawByte};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Staged byte writes keyed by address.
pub type EncodedWrites = BTreeMap<AddressKey, RawByte>;

// =============================================================================
// WRITE VALUE
// =============================================================================

/// A value supplied for one address in a write request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WriteValue {
    /// A JSON integer.
    Number(i64),
    /// A decimal number, a lookup result string, or a raw `0xNN` byte.
    Text(String),
}

impl WriteValue {
    /// Interpret an arbitrary JSON value for `address`.
    ///
    /// Integers and strings are accepted; anything else (floats, booleans,
    /// null, containers) is an `InvalidValue`.
    pub fn from_json(address: &str, value: &serde_json::Value) -> Result<Self, CodecError> {
        match value {
            serde_json::Value::String(s) => Ok(Self::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_i64().map(Self::Number).ok_or_else(|| {
                invalid_value(address, format!("{} is not an integer", n))
            }),
            other => Err(invalid_value(
                address,
                format!("unsupported value {}", other),
            )),
        }
    }
}

impl From<i64> for WriteValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for WriteValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

fn invalid_value(address: &str, reason: String) -> CodecError {
    match AddressKey::parse(address) {
        Ok(address) => CodecError::InvalidValue { address, reason },
        Err(_) => CodecError::InvalidAddress(address.to_string()),
    }
}

/// Outcome of a successful write or reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReceipt {
    /// Number of addresses written.
    pub written: usize,
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encode a batch of `(address, value)` pairs into byte writes.
///
/// Addresses may appear only once per batch.
pub fn encode<S: AsRef<str>>(
    catalog: &Catalog,
    values: &[(S, WriteValue)],
) -> Result<EncodedWrites, CodecError> {
    if values.len() > MAX_REQUEST_ADDRESSES {
        return Err(CodecError::InvalidRequest(format!(
            "address count {} exceeds maximum {}",
            values.len(),
            MAX_REQUEST_ADDRESSES
        )));
    }

    let addresses: Vec<&str> = values.iter().map(|(a, _)| a.as_ref()).collect();
    let keys = catalog.resolve_all(&addresses)?;

    let mut seen = BTreeSet::new();
    let mut writes = EncodedWrites::new();
    for (key, (_, value)) in keys.iter().zip(values) {
        if !seen.insert(*key) {
            return Err(CodecError::InvalidRequest(format!(
                "address {} appears more than once",
                key
            )));
        }
        let entry = catalog
            .get(key)
            .ok_or_else(|| CodecError::UnknownAddress {
                missing: vec![key.to_string()],
            })?;
        writes.insert(*key, encode_entry(entry, value)?);
    }

    tracing::debug!("Encoded {} writes", writes.len());
    Ok(writes)
}

/// Encode one value against one catalog entry.
pub fn encode_entry(entry: &CatalogEntry, value: &WriteValue) -> Result<RawByte, CodecError> {
    match &entry.rule {
        Rule::Number { weight } => encode_number(entry.address, *weight, value),
        Rule::Lookup(table) => {
            let text = match value {
                WriteValue::Number(n) => n.to_string(),
                WriteValue::Text(s) => s.clone(),
            };

            let candidates = table.reverse(&text);
            match candidates.as_slice() {
                [raw] => Ok(*raw),
                [] => RawByte::parse(&text).map_err(|_| CodecError::NoReverseMapping {
                    address: entry.address,
                    value: text.clone(),
                    table: table.key.clone(),
                }),
                _ => Err(CodecError::AmbiguousReverseLookup {
                    address: entry.address,
                    value: text,
                    candidates,
                }),
            }
        }
    }
}

fn encode_number(
    address: AddressKey,
    weight: u32,
    value: &WriteValue,
) -> Result<RawByte, CodecError> {
    let number = match value {
        WriteValue::Number(n) => *n,
        WriteValue::Text(s) => {
            if let Ok(raw) = RawByte::parse(s) {
                return Ok(raw);
            }
            s.trim().parse::<i64>().map_err(|_| CodecError::InvalidValue {
                address,
                reason: format!("{:?} is not a whole number", s),
            })?
        }
    };

    let max = i64::from(u8::MAX) * i64::from(weight);
    if number < 0 || number > max {
        return Err(CodecError::ValueOutOfRange {
            address,
            value: number,
            max,
        });
    }
    if number % i64::from(weight) != 0 {
        return Err(CodecError::PrecisionLoss {
            address,
            value: number,
            weight,
        });
    }

    let quotient = number / i64::from(weight);
    u8::try_from(quotient)
        .map(RawByte)
        .map_err(|_| CodecError::ValueOutOfRange {
            address,
            value: number,
            max,
        })
}

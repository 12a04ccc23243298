//! # Catalog Store
//!
//! Parses the declarative RAM catalog: which addresses are known, what they
//! mean, and how their bytes translate to values.
//!
//! The file has two sections:
//!
//! ```json
//! {
//!   "lookups": [{ "key": "enemy", "default": "?", "map": { "0x00": "Imp" } }],
//!   "catalog": [
//!     { "address": "0x006BE4", "description": "Enemy 1 type", "type": "lookup", "lookup": "enemy" },
//!     { "address": "0x00610A", "description": "Char 1 HP", "type": "number", "weight": 1 }
//!   ]
//! }
//! ```
//!
//! Every entry is resolved to exactly one [`Rule`] at load time. An entry with
//! an unknown type, a missing weight, or a reference to an undefined lookup
//! table fails the whole load; no partial catalog is ever served.

use crate::files::{describe_read_error, read_limited};
use crate::{AddressKey, CodecError, RawByte};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

// =============================================================================
// FILE FORMAT
// =============================================================================

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    lookups: Option<Vec<LookupFile>>,
    #[serde(default)]
    catalog: Option<Vec<EntryFile>>,
}

#[derive(Debug, Deserialize)]
struct LookupFile {
    key: String,
    default: Option<String>,
    #[serde(default)]
    map: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct EntryFile {
    address: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type", default)]
    kind: String,
    weight: Option<i64>,
    lookup: Option<String>,
}

// =============================================================================
// LOOKUP TABLE
// =============================================================================

/// A named translation table from raw byte to result string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable {
    /// Table name referenced by catalog entries.
    pub key: String,
    /// Result for any byte not in `map`.
    pub default: String,
    /// Known byte translations.
    pub map: BTreeMap<RawByte, String>,
}

impl LookupTable {
    /// Translate a raw byte, falling back to the default.
    #[must_use]
    pub fn resolve(&self, raw: RawByte) -> &str {
        self.map.get(&raw).map_or(self.default.as_str(), String::as_str)
    }

    /// All raw bytes that translate to `value`, in ascending order.
    #[must_use]
    pub fn reverse(&self, value: &str) -> Vec<RawByte> {
        self.map
            .iter()
            .filter(|(_, result)| result.as_str() == value)
            .map(|(raw, _)| *raw)
            .collect()
    }
}

// =============================================================================
// RULES & ENTRIES
// =============================================================================

/// How one address is decoded and encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Byte value times `weight`, rendered as a decimal string.
    Number { weight: u32 },
    /// Byte translated through a lookup table.
    Lookup(Arc<LookupTable>),
}

impl Rule {
    /// Catalog `type` name for this rule.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::Lookup(_) => "lookup",
        }
    }
}

/// One catalogued address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub address: AddressKey,
    pub description: String,
    pub rule: Rule,
}

/// Flat, serializable view of an entry for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub address: AddressKey,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lookup: Option<String>,
}

impl From<&CatalogEntry> for EntrySummary {
    fn from(entry: &CatalogEntry) -> Self {
        let (weight, lookup) = match &entry.rule {
            Rule::Number { weight } => (Some(*weight), None),
            Rule::Lookup(table) => (None, Some(table.key.clone())),
        };
        Self {
            address: entry.address,
            description: entry.description.clone(),
            kind: entry.rule.kind().to_string(),
            weight,
            lookup,
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// The parsed, validated catalog index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<AddressKey, CatalogEntry>,
    lookups: BTreeMap<String, Arc<LookupTable>>,
}

impl Catalog {
    /// Load and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self, CodecError> {
        let load_err = |reason: String| CodecError::CatalogLoad {
            path: path.display().to_string(),
            reason,
        };

        let data = read_limited(path).map_err(|e| load_err(describe_read_error(&e)))?;
        let catalog = Self::from_slice(&data).map_err(|e| match e {
            CodecError::Serialization(reason) => load_err(reason),
            other => other,
        })?;

        tracing::info!(
            "Loaded catalog from {}: {} entries, {} lookup tables",
            path.display(),
            catalog.len(),
            catalog.lookups.len()
        );
        Ok(catalog)
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Self::from_slice(json.as_bytes())
    }

    /// Parse a catalog from JSON bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, CodecError> {
        let file: CatalogFile =
            serde_json::from_slice(data).map_err(|e| CodecError::Serialization(e.to_string()))?;

        let mut lookups = BTreeMap::new();
        for item in file.lookups.unwrap_or_default() {
            let table = parse_lookup(item)?;
            if lookups.contains_key(&table.key) {
                return Err(CodecError::CatalogSchema(format!(
                    "duplicate lookup table {:?}",
                    table.key
                )));
            }
            lookups.insert(table.key.clone(), Arc::new(table));
        }

        let mut entries = BTreeMap::new();
        for item in file.catalog.unwrap_or_default() {
            let entry = parse_entry(item, &lookups)?;
            if entries.contains_key(&entry.address) {
                return Err(CodecError::CatalogSchema(format!(
                    "duplicate catalog address {}",
                    entry.address
                )));
            }
            entries.insert(entry.address, entry);
        }

        Ok(Self { entries, lookups })
    }

    /// Get the entry for an address.
    #[must_use]
    pub fn get(&self, address: &AddressKey) -> Option<&CatalogEntry> {
        self.entries.get(address)
    }

    /// Check whether an address is catalogued.
    #[must_use]
    pub fn contains(&self, address: &AddressKey) -> bool {
        self.entries.contains_key(address)
    }

    /// Get a lookup table by key.
    #[must_use]
    pub fn lookup_table(&self, key: &str) -> Option<&Arc<LookupTable>> {
        self.lookups.get(key)
    }

    /// Iterate entries in ascending address order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Listing of every entry, in ascending address order.
    #[must_use]
    pub fn summaries(&self) -> Vec<EntrySummary> {
        self.entries().map(EntrySummary::from).collect()
    }

    /// Number of catalogued addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve request strings to catalogued keys.
    ///
    /// Every string is checked before anything is returned: the error lists
    /// all strings that are malformed or not catalogued, in request order.
    pub fn resolve_all<S: AsRef<str>>(&self, addresses: &[S]) -> Result<Vec<AddressKey>, CodecError> {
        let mut keys = Vec::with_capacity(addresses.len());
        let mut missing = Vec::new();

        for raw in addresses {
            let raw = raw.as_ref();
            match AddressKey::parse(raw) {
                Ok(key) if self.contains(&key) => keys.push(key),
                _ => missing.push(raw.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(keys)
        } else {
            Err(CodecError::UnknownAddress { missing })
        }
    }
}

fn parse_lookup(item: LookupFile) -> Result<LookupTable, CodecError> {
    let default = item.default.ok_or_else(|| {
        CodecError::CatalogSchema(format!("lookup table {:?} has no default", item.key))
    })?;

    let mut map = BTreeMap::new();
    for (raw, result) in item.map {
        let byte = RawByte::parse(&raw).map_err(|_| {
            CodecError::CatalogSchema(format!(
                "lookup table {:?} has malformed raw key {:?}",
                item.key, raw
            ))
        })?;
        if map.insert(byte, result).is_some() {
            return Err(CodecError::CatalogSchema(format!(
                "lookup table {:?} maps {} more than once",
                item.key, byte
            )));
        }
    }

    Ok(LookupTable {
        key: item.key,
        default,
        map,
    })
}

fn parse_entry(
    item: EntryFile,
    lookups: &BTreeMap<String, Arc<LookupTable>>,
) -> Result<CatalogEntry, CodecError> {
    let address = AddressKey::parse(&item.address).map_err(|_| {
        CodecError::CatalogSchema(format!("malformed catalog address {:?}", item.address))
    })?;

    let rule = match item.kind.as_str() {
        "number" => {
            let weight = item.weight.ok_or_else(|| {
                CodecError::CatalogSchema(format!("number entry {} has no weight", address))
            })?;
            let weight = u32::try_from(weight).ok().filter(|w| *w >= 1).ok_or_else(|| {
                CodecError::CatalogSchema(format!(
                    "number entry {} has invalid weight {}",
                    address, weight
                ))
            })?;
            Rule::Number { weight }
        }
        "lookup" => {
            let key = item.lookup.ok_or_else(|| {
                CodecError::CatalogSchema(format!("lookup entry {} names no table", address))
            })?;
            let table = lookups.get(&key).ok_or_else(|| {
                CodecError::CatalogSchema(format!(
                    "lookup entry {} references undefined table {:?}",
                    address, key
                ))
            })?;
            Rule::Lookup(Arc::clone(table))
        }
        other => {
            return Err(CodecError::CatalogSchema(format!(
                "entry {} has unknown type {:?}",
                address, other
            )));
        }
    };

    Ok(CatalogEntry {
        address,
        description: item.description,
        rule,
    })
}

// =============================================================================
// TESTS
// =============================================================================

//! # Value Decoder
//!
//! Applies catalog rules to snapshot bytes, producing the strings a caller
//! actually wants to see.
//!
//! A decode call is all-or-nothing: every requested address is validated
//! against the catalog first, and the error lists every unknown one. Only then
//! are bytes read; the first corrupt byte fails the call.

use crate::catalog::{CatalogEntry, Rule};
use crate::layout::imp_exists_flag;
use crate::primitives::{IMP_TOKEN, MAX_REQUEST_ADDRESSES};
use crate::{AddressKey, Catalog, CodecError, Snapshot};
use std::collections::BTreeMap;

/// Decoded values keyed by address.
pub type DecodedValues = BTreeMap<AddressKey, String>;

/// Read-side view over one catalog and one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    catalog: &'a Catalog,
    snapshot: &'a Snapshot,
}

impl<'a> Decoder<'a> {
    /// Create a decoder.
    #[must_use]
    pub fn new(catalog: &'a Catalog, snapshot: &'a Snapshot) -> Self {
        Self { catalog, snapshot }
    }

    /// Decode a batch of address strings.
    pub fn decode<S: AsRef<str>>(&self, addresses: &[S]) -> Result<DecodedValues, CodecError> {
        if addresses.len() > MAX_REQUEST_ADDRESSES {
            return Err(CodecError::InvalidRequest(format!(
                "address count {} exceeds maximum {}",
                addresses.len(),
                MAX_REQUEST_ADDRESSES
            )));
        }

        let keys = self.catalog.resolve_all(addresses)?;
        self.decode_keys(&keys)
    }

    /// Decode a batch of already-parsed keys.
    pub fn decode_keys(&self, keys: &[AddressKey]) -> Result<DecodedValues, CodecError> {
        let missing: Vec<String> = keys
            .iter()
            .filter(|k| !self.catalog.contains(k))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(CodecError::UnknownAddress { missing });
        }

        let mut values = DecodedValues::new();
        for key in keys {
            if values.contains_key(key) {
                continue;
            }
            let value = self.decode_one(key)?;
            values.insert(*key, value);
        }

        tracing::debug!("Decoded {} addresses", values.len());
        Ok(values)
    }

    /// Decode a single catalogued address.
    pub fn decode_one(&self, key: &AddressKey) -> Result<String, CodecError> {
        let entry = self
            .catalog
            .get(key)
            .ok_or_else(|| CodecError::UnknownAddress {
                missing: vec![key.to_string()],
            })?;
        self.decode_entry(entry)
    }

    fn decode_entry(&self, entry: &CatalogEntry) -> Result<String, CodecError> {
        let raw = self.snapshot.require(&entry.address)?;

        match &entry.rule {
            Rule::Lookup(table) => {
                let value = table.resolve(raw);
                if value == IMP_TOKEN && !self.imp_present(entry.address) {
                    return Ok(String::new());
                }
                Ok(value.to_string())
            }
            Rule::Number { weight } => {
                Ok((u64::from(raw.value()) * u64::from(*weight)).to_string())
            }
        }
    }

    /// Confirm an Imp really occupies an enemy slot.
    ///
    /// Enemy code 0 is the Imp, and an empty slot is also all zeroes. Only a
    /// present, zero-valued exists flag marks the slot as empty. A missing or
    /// unreadable flag, or an address without one, keeps the Imp.
    fn imp_present(&self, address: AddressKey) -> bool {
        let Some(flag) = imp_exists_flag(address) else {
            return true;
        };
        !matches!(self.snapshot.byte(&flag), Ok(Some(byte)) if byte.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawByte;

    const CATALOG: &str = r#"{
        "lookups": [
            { "key": "enemy", "default": "Unknown", "map": { "0x00": "Imp", "0x01": "Goblin" } },
            { "key": "letter", "default": "?", "map": { "0x8A": "A", "0x8B": "B" } }
        ],
        "catalog": [
            { "address": "0x006BE4", "description": "Enemy 1 type", "type": "lookup", "lookup": "enemy" },
            { "address": "0x006BE5", "description": "Unpaired enemy byte", "type": "lookup", "lookup": "enemy" },
            { "address": "0x006102", "description": "Char 1 letter", "type": "lookup", "lookup": "letter" },
            { "address": "0x00610A", "description": "Char 1 HP", "type": "number", "weight": 1 },
            { "address": "0x00611C", "description": "Char 1 gold", "type": "number", "weight": 10 }
        ]
    }"#;

    fn catalog() -> Catalog {
        Catalog::from_json(CATALOG).expect("catalog")
    }

    fn snapshot(pairs: &[(u16, &str)]) -> Snapshot {
        let json: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(a, v)| (AddressKey::from_u16(*a).to_string(), (*v).into()))
            .collect();
        Snapshot::from_json(&serde_json::Value::Object(json).to_string()).expect("snapshot")
    }

    fn decode_single(catalog: &Catalog, snap: &Snapshot, address: &str) -> Result<String, CodecError> {
        let values = Decoder::new(catalog, snap).decode(&[address])?;
        let key = AddressKey::parse(address)?;
        Ok(values.get(&key).cloned().unwrap_or_default())
    }

    #[test]
    fn number_rule_multiplies_by_weight() {
        let catalog = catalog();
        let snap = snapshot(&[(0x610A, "0x2A"), (0x611C, "0xFF")]);

        assert_eq!(decode_single(&catalog, &snap, "0x00610A").expect("hp"), "42");
        assert_eq!(decode_single(&catalog, &snap, "0x00611C").expect("gold"), "2550");
    }

    #[test]
    fn number_rule_wide_weight_does_not_wrap() {
        let catalog = Catalog::from_json(
            r#"{"lookups": [], "catalog": [
                { "address": "0x006120", "description": "Wide", "type": "number", "weight": 20000000 }
            ]}"#,
        )
        .expect("catalog");
        let snap = snapshot(&[(0x6120, "0xFF")]);

        assert_eq!(decode_single(&catalog, &snap, "0x006120").expect("wide"), "5100000000");
    }

    #[test]
    fn lookup_rule_maps_or_defaults() {
        let catalog = catalog();
        let snap = snapshot(&[(0x6102, "0x8b"), (0x6BE4, "0x01"), (0x6BE5, "0x33")]);

        assert_eq!(decode_single(&catalog, &snap, "0x006102").expect("letter"), "B");
        assert_eq!(decode_single(&catalog, &snap, "0x006BE4").expect("enemy"), "Goblin");
        assert_eq!(decode_single(&catalog, &snap, "0x006BE5").expect("enemy"), "Unknown");
    }

    #[test]
    fn imp_with_zero_exists_flag_is_blank() {
        let catalog = catalog();
        let snap = snapshot(&[(0x6BE4, "0x00"), (0x6BDF, "0x00")]);
        assert_eq!(decode_single(&catalog, &snap, "0x006BE4").expect("enemy"), "");
    }

    #[test]
    fn imp_with_nonzero_exists_flag_stays() {
        let catalog = catalog();
        for flag in ["0x01", "0x80", "0xFF"] {
            let snap = snapshot(&[(0x6BE4, "0x00"), (0x6BDF, flag)]);
            assert_eq!(decode_single(&catalog, &snap, "0x006BE4").expect("enemy"), "Imp");
        }
    }

    #[test]
    fn imp_with_malformed_exists_flag_stays() {
        let catalog = catalog();
        let snap = snapshot(&[(0x6BE4, "0x00"), (0x6BDF, "zz")]);
        assert_eq!(decode_single(&catalog, &snap, "0x006BE4").expect("enemy"), "Imp");
    }

    #[test]
    fn imp_without_companion_entry_stays() {
        let catalog = catalog();
        let snap = snapshot(&[(0x6BE5, "0x00")]);
        assert_eq!(decode_single(&catalog, &snap, "0x006BE5").expect("enemy"), "Imp");

        // Absent flag keeps the Imp as well
        let snap = snapshot(&[(0x6BE4, "0x00")]);
        assert_eq!(decode_single(&catalog, &snap, "0x006BE4").expect("enemy"), "Imp");
    }

    #[test]
    fn unknown_address_fails_whole_batch() {
        let catalog = catalog();
        let snap = snapshot(&[(0x610A, "0x01")]);

        let err = Decoder::new(&catalog, &snap)
            .decode(&["0x00610A", "0x00FFFF", "0x00610A", "0x000000"])
            .expect_err("unknown");

        assert!(err.is_caller_error());
        match err {
            CodecError::UnknownAddress { missing } => {
                assert_eq!(missing, vec!["0x00FFFF".to_string(), "0x000000".to_string()]);
            }
            other => unreachable!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_memory_is_fatal() {
        let catalog = catalog();
        let snap = snapshot(&[(0x610A, "0xZZ")]);
        let err = decode_single(&catalog, &snap, "0x00610A").expect_err("malformed");
        assert!(matches!(err, CodecError::MalformedMemory { .. }));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn missing_snapshot_value_is_fatal() {
        let catalog = catalog();
        let snap = snapshot(&[]);
        let err = decode_single(&catalog, &snap, "0x006102").expect_err("missing");
        assert!(matches!(err, CodecError::MissingSnapshotAddress(_)));
    }

    #[test]
    fn duplicate_requests_decode_once() {
        let catalog = catalog();
        let snap = snapshot(&[(0x610A, "0x03")]);
        let values = Decoder::new(&catalog, &snap)
            .decode(&["0x00610A", "0x00610A"])
            .expect("decode");
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn decode_keys_matches_decode() {
        let catalog = catalog();
        let snap = Snapshot::from_bytes([(AddressKey::from_u16(0x610A), RawByte(7))]);
        let decoder = Decoder::new(&catalog, &snap);

        let by_key = decoder
            .decode_keys(&[AddressKey::from_u16(0x610A)])
            .expect("keys");
        let by_str = decoder.decode(&["0x00610A"]).expect("strings");
        assert_eq!(by_key, by_str);
    }
}

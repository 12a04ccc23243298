//! # Snapshot Store
//!
//! The emulator exports its RAM as a flat JSON object of address to byte
//! string. A [`Snapshot`] is one immutable, point-in-time copy of that file;
//! the [`SnapshotStore`] reads a fresh one per operation and writes updates
//! back as a single atomic file replacement.
//!
//! Byte strings are kept as exported and parsed per address on access. A
//! corrupt byte at one address therefore fails only the operations that
//! actually read it.

use crate::files::{describe_read_error, read_limited, write_atomic};
use crate::{AddressKey, CodecError, RawByte};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// =============================================================================
// SNAPSHOT
// =============================================================================

/// A point-in-time image of emulator memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    bytes: BTreeMap<AddressKey, String>,
}

impl Snapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from JSON bytes.
    ///
    /// Keys must be canonical addresses. Values are kept as text and checked
    /// lazily by [`Snapshot::byte`], so a non-string value only fails reads of
    /// its own address.
    pub fn from_slice(data: &[u8]) -> Result<Self, CodecError> {
        let raw: BTreeMap<String, serde_json::Value> =
            serde_json::from_slice(data).map_err(|e| CodecError::Serialization(e.to_string()))?;

        let mut bytes = BTreeMap::new();
        for (key, value) in raw {
            let address = AddressKey::parse(&key).map_err(|_| {
                CodecError::Serialization(format!("snapshot key {:?} is not an address", key))
            })?;
            let text = match value {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            };
            bytes.insert(address, text);
        }

        Ok(Self { bytes })
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Self::from_slice(json.as_bytes())
    }

    /// Build a snapshot from already-validated bytes.
    pub fn from_bytes(bytes: impl IntoIterator<Item = (AddressKey, RawByte)>) -> Self {
        Self {
            bytes: bytes
                .into_iter()
                .map(|(address, byte)| (address, byte.to_string()))
                .collect(),
        }
    }

    /// The exported byte string at an address, unparsed.
    #[must_use]
    pub fn raw(&self, address: &AddressKey) -> Option<&str> {
        self.bytes.get(address).map(String::as_str)
    }

    /// The byte at an address.
    ///
    /// Returns `Ok(None)` if the address is absent and `MalformedMemory` if
    /// the exported string is not a `0xNN` byte.
    pub fn byte(&self, address: &AddressKey) -> Result<Option<RawByte>, CodecError> {
        match self.bytes.get(address) {
            None => Ok(None),
            Some(text) => RawByte::parse(text)
                .map(Some)
                .map_err(|_| CodecError::MalformedMemory {
                    address: *address,
                    raw: text.clone(),
                }),
        }
    }

    /// The byte at an address that must be present.
    pub fn require(&self, address: &AddressKey) -> Result<RawByte, CodecError> {
        self.byte(address)?
            .ok_or(CodecError::MissingSnapshotAddress(*address))
    }

    /// Copy of this snapshot with `writes` merged in.
    #[must_use]
    pub fn merged(&self, writes: &BTreeMap<AddressKey, RawByte>) -> Self {
        let mut next = self.clone();
        for (address, byte) in writes {
            next.bytes.insert(*address, byte.to_string());
        }
        next
    }

    /// Number of addresses in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Serialize to pretty JSON in ascending address order.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, CodecError> {
        let ordered: BTreeMap<String, &str> = self
            .bytes
            .iter()
            .map(|(address, text)| (address.to_string(), text.as_str()))
            .collect();
        serde_json::to_vec_pretty(&ordered).map_err(|e| CodecError::Serialization(e.to_string()))
    }
}

// =============================================================================
// SNAPSHOT STORE
// =============================================================================

/// File-backed access to the current snapshot.
///
/// Holds no cached state: the emulator rewrites the file continuously, so
/// every `load` reads it again.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store for the snapshot file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current snapshot.
    pub fn load(&self) -> Result<Snapshot, CodecError> {
        let load_err = |reason: String| CodecError::SnapshotLoad {
            path: self.path.display().to_string(),
            reason,
        };

        let data = read_limited(&self.path).map_err(|e| load_err(describe_read_error(&e)))?;
        Snapshot::from_slice(&data).map_err(|e| match e {
            CodecError::Serialization(reason) => load_err(reason),
            other => other,
        })
    }

    /// Replace the snapshot file with `snapshot`.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), CodecError> {
        let data = snapshot.to_json_vec()?;
        write_atomic(&self.path, &data).map_err(|e| {
            CodecError::Io(format!("write {}: {}", self.path.display(), e))
        })
    }

    /// Merge `writes` into `base` and persist the result atomically.
    ///
    /// `base` must be the snapshot the writes were computed from.
    pub fn apply(
        &self,
        base: &Snapshot,
        writes: &BTreeMap<AddressKey, RawByte>,
    ) -> Result<Snapshot, CodecError> {
        let next = base.merged(writes);
        self.save(&next)?;
        tracing::info!(
            "Wrote {} addresses to {}",
            writes.len(),
            self.path.display()
        );
        Ok(next)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(address: u16) -> AddressKey {
        AddressKey::from_u16(address)
    }

    #[test]
    fn parses_flat_object() {
        let snapshot =
            Snapshot::from_json(r#"{"0x006100": "0x05", "0x006101": "0xff"}"#).expect("parse");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.require(&key(0x6100)).expect("byte"), RawByte(5));
        assert_eq!(snapshot.require(&key(0x6101)).expect("byte"), RawByte(0xFF));
    }

    #[test]
    fn malformed_byte_fails_only_on_access() {
        let snapshot =
            Snapshot::from_json(r#"{"0x006100": "0x05", "0x006101": "garbage"}"#).expect("parse");
        assert!(snapshot.byte(&key(0x6100)).is_ok());
        assert!(matches!(
            snapshot.byte(&key(0x6101)),
            Err(CodecError::MalformedMemory { .. })
        ));
    }

    #[test]
    fn absent_address_is_none_or_missing() {
        let snapshot = Snapshot::new();
        assert_eq!(snapshot.byte(&key(0x6100)).expect("ok"), None);
        assert!(matches!(
            snapshot.require(&key(0x6100)),
            Err(CodecError::MissingSnapshotAddress(_))
        ));
    }

    #[test]
    fn non_string_value_is_malformed_memory() {
        let snapshot = Snapshot::from_json(r#"{"0x006100": 5}"#).expect("parse");
        assert!(matches!(
            snapshot.byte(&key(0x6100)),
            Err(CodecError::MalformedMemory { .. })
        ));
    }

    #[test]
    fn merged_leaves_original_untouched() {
        let base = Snapshot::from_bytes([(key(0x6100), RawByte(1))]);
        let writes = [(key(0x6100), RawByte(2)), (key(0x6101), RawByte(3))]
            .into_iter()
            .collect();

        let next = base.merged(&writes);
        assert_eq!(base.require(&key(0x6100)).expect("byte"), RawByte(1));
        assert_eq!(next.require(&key(0x6100)).expect("byte"), RawByte(2));
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn store_roundtrip_keeps_address_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("ram_contents.json"));

        let snapshot = Snapshot::from_bytes([(key(0x6BD3), RawByte(9)), (key(0x6100), RawByte(1))]);
        store.save(&snapshot).expect("save");

        let text = std::fs::read_to_string(store.path()).expect("read");
        let first = text.find("0x006100").expect("first key");
        let second = text.find("0x006BD3").expect("second key");
        assert!(first < second);

        assert_eq!(store.load().expect("load"), snapshot);
    }

    #[test]
    fn load_missing_file_is_snapshot_load_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("ram_contents.json"));
        assert!(matches!(store.load(), Err(CodecError::SnapshotLoad { .. })));
    }
}

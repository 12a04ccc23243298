//! # Property-Based Tests
//!
//! Decode/encode laws and reorder invariants, checked with proptest.

use nesram_core::layout::{stat_block, stat_blocks};
use nesram_core::{
    AddressKey, Catalog, CodecError, Decoder, Permutation, RawByte, Snapshot, WriteValue, encode,
    stage_reorder,
};
use proptest::collection::vec;
use proptest::prelude::*;

// =============================================================================
// HELPERS
// =============================================================================

const TARGET: &str = "0x006120";

fn number_catalog(weight: u32) -> Catalog {
    let json = format!(
        r#"{{"catalog": [{{"address": "{}", "description": "stat", "type": "number", "weight": {}}}]}}"#,
        TARGET, weight
    );
    Catalog::from_json(&json).expect("catalog")
}

fn lookup_catalog() -> Catalog {
    Catalog::from_json(
        r#"{
            "lookups": [{ "key": "t", "default": "fallback", "map": { "0x01": "one", "0x02": "two" } }],
            "catalog": [{ "address": "0x006120", "description": "kind", "type": "lookup", "lookup": "t" }]
        }"#,
    )
    .expect("catalog")
}

fn target() -> AddressKey {
    AddressKey::parse(TARGET).expect("target")
}

fn party_snapshot(bytes: &[u8]) -> Snapshot {
    Snapshot::from_bytes(
        stat_blocks()
            .into_iter()
            .flatten()
            .zip(bytes.iter().copied().map(RawByte)),
    )
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Number rule decodes to raw times weight.
    #[test]
    fn number_decode_is_raw_times_weight(raw in any::<u8>(), weight in 1u32..=u32::MAX) {
        let catalog = number_catalog(weight);
        let snapshot = Snapshot::from_bytes([(target(), RawByte(raw))]);

        let values = Decoder::new(&catalog, &snapshot).decode(&[TARGET]).expect("decode");
        let expected = (u64::from(raw) * u64::from(weight)).to_string();
        prop_assert_eq!(values.get(&target()), Some(&expected));
    }

    /// Encoding a decoded number gives back the original byte.
    #[test]
    fn number_encode_inverts_decode(raw in any::<u8>(), weight in 1u32..=u32::MAX) {
        let catalog = number_catalog(weight);
        let snapshot = Snapshot::from_bytes([(target(), RawByte(raw))]);

        let values = Decoder::new(&catalog, &snapshot).decode(&[TARGET]).expect("decode");
        let decoded = values.get(&target()).cloned().unwrap_or_default();

        let writes = encode(&catalog, &[(TARGET, WriteValue::Text(decoded))]).expect("encode");
        prop_assert_eq!(writes.get(&target()), Some(&RawByte(raw)));
    }

    /// Values that are not multiples of the weight are rejected, not rounded.
    #[test]
    fn number_encode_rejects_remainders(quotient in 0i64..255, weight in 2u32..100, rem in 1i64..100) {
        prop_assume!(rem < i64::from(weight));
        let catalog = number_catalog(weight);
        let value = quotient * i64::from(weight) + rem;

        let result = encode(&catalog, &[(TARGET, WriteValue::Number(value))]);
        prop_assert!(matches!(result, Err(CodecError::PrecisionLoss { .. })), "expected PrecisionLoss, got {:?}", result);
    }

    /// Bytes missing from a lookup map decode to the table default.
    #[test]
    fn unmapped_lookup_decodes_to_default(raw in 3u8..=255) {
        let catalog = lookup_catalog();
        let snapshot = Snapshot::from_bytes([(target(), RawByte(raw))]);

        let values = Decoder::new(&catalog, &snapshot).decode(&[TARGET]).expect("decode");
        prop_assert_eq!(values.get(&target()).map(String::as_str), Some("fallback"));
    }

    /// The identity permutation leaves memory unchanged.
    #[test]
    fn identity_reorder_is_noop(bytes in vec(any::<u8>(), 256)) {
        let snapshot = party_snapshot(&bytes);
        let writes = stage_reorder(&snapshot, &Permutation::IDENTITY).expect("stage");
        prop_assert_eq!(snapshot.merged(&writes), snapshot);
    }

    /// Any permutation moves each block intact to its destination.
    #[test]
    fn reorder_copies_whole_blocks(bytes in vec(any::<u8>(), 256), order in Just(vec![1i64, 2, 3, 4]).prop_shuffle()) {
        let snapshot = party_snapshot(&bytes);
        let perm = Permutation::new(&order).expect("perm");
        let next = snapshot.merged(&stage_reorder(&snapshot, &perm).expect("stage"));

        for (destination, source) in perm.sources().iter().enumerate() {
            let to = stat_block(destination).expect("destination");
            let from = stat_block(source - 1).expect("source");
            for (a, b) in to.iter().zip(from.iter()) {
                prop_assert_eq!(next.require(a).expect("a"), snapshot.require(b).expect("b"));
            }
        }
    }
}

//! # Block Reorder Engine
//!
//! Rearranges the four party stat blocks by copying whole blocks between
//! slots.
//!
//! Every source byte is read from the unmodified snapshot before any write is
//! staged, so cycles such as swapping slots 1 and 2 never read back a value
//! that was already overwritten. Blocks correspond position by position, not
//! by raw memory offset.

use crate::layout::{party, stat_blocks};
use crate::{AddressKey, CodecError, RawByte, Snapshot};
use std::collections::BTreeMap;

/// A validated arrangement of the four party slots.
///
/// `sources()[i]` is the one-based slot whose block is copied into slot
/// `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permutation([usize; party::SLOTS]);

impl Permutation {
    /// The arrangement that leaves every slot in place.
    pub const IDENTITY: Self = Self([1, 2, 3, 4]);

    /// Validate caller-supplied slot numbers.
    pub fn new(sources: &[i64]) -> Result<Self, CodecError> {
        if sources.len() != party::SLOTS {
            return Err(CodecError::InvalidPermutation(format!(
                "expected {} slots, got {}",
                party::SLOTS,
                sources.len()
            )));
        }

        let mut slots = [0usize; party::SLOTS];
        let mut seen = [false; party::SLOTS];
        for (i, &source) in sources.iter().enumerate() {
            let slot = usize::try_from(source)
                .ok()
                .filter(|s| (1..=party::SLOTS).contains(s))
                .ok_or_else(|| {
                    CodecError::InvalidPermutation(format!(
                        "slot {} must be between 1 and {}, got {}",
                        i + 1,
                        party::SLOTS,
                        source
                    ))
                })?;
            if seen[slot - 1] {
                return Err(CodecError::InvalidPermutation(format!(
                    "slot {} is used more than once",
                    slot
                )));
            }
            seen[slot - 1] = true;
            slots[i] = slot;
        }

        Ok(Self(slots))
    }

    /// Validate slot numbers given as arbitrary JSON values.
    ///
    /// Anything that is not an integer is an `InvalidPermutation`.
    pub fn from_json(values: &[serde_json::Value]) -> Result<Self, CodecError> {
        let sources = values
            .iter()
            .map(|v| {
                v.as_i64().ok_or_else(|| {
                    CodecError::InvalidPermutation(format!("slot {} is not an integer", v))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&sources)
    }

    /// One-based source slot for each destination slot.
    #[must_use]
    pub fn sources(&self) -> [usize; party::SLOTS] {
        self.0
    }

    /// Check whether this arrangement moves nothing.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Stage the byte writes that realize `permutation` over the standard party
/// layout.
pub fn stage_reorder(
    snapshot: &Snapshot,
    permutation: &Permutation,
) -> Result<BTreeMap<AddressKey, RawByte>, CodecError> {
    stage_block_copy(snapshot, &stat_blocks(), permutation)
}

/// Stage the byte writes that copy `blocks[source - 1]` into each
/// destination block.
pub fn stage_block_copy(
    snapshot: &Snapshot,
    blocks: &[Vec<AddressKey>],
    permutation: &Permutation,
) -> Result<BTreeMap<AddressKey, RawByte>, CodecError> {
    if blocks.len() != party::SLOTS {
        return Err(CodecError::BlockLayout(format!(
            "expected {} blocks, found {}",
            party::SLOTS,
            blocks.len()
        )));
    }
    let len = blocks[0].len();
    if let Some((slot, block)) = blocks.iter().enumerate().find(|(_, b)| b.len() != len) {
        return Err(CodecError::BlockLayout(format!(
            "block {} has {} addresses, block 1 has {}",
            slot + 1,
            block.len(),
            len
        )));
    }

    // Read every block from the untouched snapshot first
    let contents = blocks
        .iter()
        .map(|block| {
            block
                .iter()
                .map(|address| {
                    snapshot
                        .byte(address)?
                        .ok_or(CodecError::MissingSourceAddress(*address))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut writes = BTreeMap::new();
    for (destination, source) in blocks.iter().zip(permutation.sources()) {
        for (address, byte) in destination.iter().zip(&contents[source - 1]) {
            writes.insert(*address, *byte);
        }
    }

    tracing::debug!(
        "Staged reorder {:?}: {} byte writes",
        permutation.sources(),
        writes.len()
    );
    Ok(writes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::stat_block;

    fn party_snapshot() -> Snapshot {
        // Each byte records its slot in the high nibble and position in the low
        Snapshot::from_bytes(stat_blocks().into_iter().enumerate().flat_map(|(slot, block)| {
            block
                .into_iter()
                .enumerate()
                .map(move |(i, address)| (address, RawByte(((slot as u8) << 4) | (i as u8 & 0x0F))))
        }))
    }

    #[test]
    fn permutation_validation() {
        assert!(Permutation::new(&[2, 4, 3, 1]).is_ok());
        assert!(Permutation::new(&[1, 2, 3]).is_err());
        assert!(Permutation::new(&[1, 2, 3, 4, 5]).is_err());
        assert!(Permutation::new(&[1, 1, 3, 4]).is_err());
        assert!(Permutation::new(&[0, 2, 3, 4]).is_err());
        assert!(Permutation::new(&[1, 2, 3, 5]).is_err());
        assert!(Permutation::new(&[-1, 2, 3, 4]).is_err());
    }

    #[test]
    fn permutation_from_json_rejects_non_integers() {
        let values: Vec<serde_json::Value> = serde_json::from_str(r#"[1, "2", 3, 4]"#).expect("json");
        let err = Permutation::from_json(&values).expect_err("string slot");
        assert!(matches!(err, CodecError::InvalidPermutation(_)));
        assert!(err.is_caller_error());

        let values: Vec<serde_json::Value> = serde_json::from_str("[1, 2.5, 3, 4]").expect("json");
        assert!(Permutation::from_json(&values).is_err());
    }

    #[test]
    fn identity_stages_current_bytes() {
        let snapshot = party_snapshot();
        let writes = stage_reorder(&snapshot, &Permutation::IDENTITY).expect("stage");
        assert_eq!(snapshot.merged(&writes), snapshot);
    }

    #[test]
    fn swap_moves_whole_blocks() {
        let snapshot = party_snapshot();
        let perm = Permutation::new(&[2, 1, 3, 4]).expect("perm");
        let next = snapshot.merged(&stage_reorder(&snapshot, &perm).expect("stage"));

        let slot = |s: usize| stat_block(s).expect("slot");
        for (a, b) in slot(0).iter().zip(slot(1).iter()) {
            assert_eq!(next.require(a).expect("a"), snapshot.require(b).expect("b"));
            assert_eq!(next.require(b).expect("b"), snapshot.require(a).expect("a"));
        }
        for address in slot(2).iter().chain(slot(3).iter()) {
            assert_eq!(next.require(address).expect("x"), snapshot.require(address).expect("x"));
        }
    }

    #[test]
    fn missing_source_is_fatal() {
        let mut bytes: Vec<(AddressKey, RawByte)> = stat_blocks()
            .into_iter()
            .flatten()
            .map(|a| (a, RawByte::ZERO))
            .collect();
        bytes.pop();
        let snapshot = Snapshot::from_bytes(bytes);

        let err = stage_reorder(&snapshot, &Permutation::IDENTITY).expect_err("missing");
        assert!(matches!(err, CodecError::MissingSourceAddress(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn unequal_blocks_are_layout_error() {
        let mut blocks = stat_blocks();
        blocks[2].pop();
        let err = stage_block_copy(&party_snapshot(), &blocks, &Permutation::IDENTITY)
            .expect_err("layout");
        assert!(matches!(err, CodecError::BlockLayout(_)));
    }
}

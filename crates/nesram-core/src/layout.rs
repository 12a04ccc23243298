//! Memory layout constants for the game's RAM structures
//!
//! This module centralizes the fixed addresses used by the reorder engine, the
//! name composer, the Imp check, and the enemy-region dump.
//! Constants are organized by structure type.

use crate::AddressKey;

/// Party stat blocks: four contiguous 64-byte records, one per slot
pub mod party {
    /// Number of party member slots
    pub const SLOTS: usize = 4;

    /// Bytes per stat block
    pub const BLOCK_LEN: u16 = 0x40;

    /// First address of slot 1's stat block
    pub const BASE: u16 = 0x6100;

    /// Offset of the 4-letter name within a stat block
    pub const NAME_OFFSET: u16 = 2;

    /// Letters per character name
    pub const NAME_LEN: u16 = 4;
}

/// Battle enemy records
pub mod enemy {
    /// Enemy type address -> companion "exists" flag address.
    pub const IMP_EXISTS_FLAGS: [(u16, u16); 9] = [
        (0x6BE4, 0x6BDF),
        (0x6BF8, 0x6BF3),
        (0x6C0C, 0x6C07),
        (0x6C20, 0x6C1B),
        (0x6C34, 0x6C2F),
        (0x6C48, 0x6C43),
        (0x6C5C, 0x6C57),
        (0x6C70, 0x6C6B),
        (0x6C84, 0x6C7F),
    ];

    /// First address of the enemy region dump
    pub const DUMP_START: u16 = 0x6BD3;

    /// Rows in the enemy region dump (one per enemy record)
    pub const DUMP_LINES: u16 = 9;

    /// Bytes per dump row (enemy record size)
    pub const DUMP_WIDTH: u16 = 20;
}

/// Addresses of one slot's stat block, in block order.
///
/// `slot` is zero-based. Returns `None` for a slot outside the party.
pub fn stat_block(slot: usize) -> Option<Vec<AddressKey>> {
    if slot >= party::SLOTS {
        return None;
    }
    let start = party::BASE + party::BLOCK_LEN * slot as u16;
    Some(
        (0..party::BLOCK_LEN)
            .map(|i| AddressKey::from_u16(start + i))
            .collect(),
    )
}

/// All four stat blocks, slot 1 first.
pub fn stat_blocks() -> Vec<Vec<AddressKey>> {
    (0..party::SLOTS).filter_map(stat_block).collect()
}

/// The four name groups (four letter addresses each), slot 1 first.
pub fn name_groups() -> Vec<Vec<AddressKey>> {
    (0..party::SLOTS as u16)
        .map(|slot| {
            let start = party::BASE + party::BLOCK_LEN * slot + party::NAME_OFFSET;
            (0..party::NAME_LEN)
                .map(|i| AddressKey::from_u16(start + i))
                .collect()
        })
        .collect()
}

/// The exists flag paired with an enemy type address, if it has one.
pub fn imp_exists_flag(address: AddressKey) -> Option<AddressKey> {
    enemy::IMP_EXISTS_FLAGS
        .iter()
        .find(|(kind, _)| u32::from(*kind) == address.value())
        .map(|(_, flag)| AddressKey::from_u16(*flag))
}

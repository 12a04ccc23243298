//! Hex dump of the battle enemy region, one enemy record per line.

use crate::layout::enemy;
use crate::{AddressKey, CodecError, Snapshot};

/// Render `lines` rows of `width` bytes starting at `start`.
///
/// Each byte is two uppercase hex digits, separated by single spaces. An
/// address absent from the snapshot renders as two spaces.
pub fn hex_rows(
    snapshot: &Snapshot,
    start: AddressKey,
    lines: u16,
    width: u16,
) -> Result<Vec<String>, CodecError> {
    (0..lines)
        .map(|line| {
            let cells = (0..width)
                .map(|column| {
                    let delta = u32::from(line) * u32::from(width) + u32::from(column);
                    let address = start.offset(delta).ok_or_else(|| {
                        CodecError::InvalidAddress(format!("{} + {}", start, delta))
                    })?;
                    Ok(match snapshot.byte(&address)? {
                        Some(byte) => format!("{:02X}", byte.value()),
                        None => "  ".to_string(),
                    })
                })
                .collect::<Result<Vec<_>, CodecError>>()?;
            Ok(cells.join(" "))
        })
        .collect()
}

/// The standard nine-record enemy dump.
pub fn enemy_dump(snapshot: &Snapshot) -> Result<Vec<String>, CodecError> {
    hex_rows(
        snapshot,
        AddressKey::from_u16(enemy::DUMP_START),
        enemy::DUMP_LINES,
        enemy::DUMP_WIDTH,
    )
}

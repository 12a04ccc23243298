//! Composite reader: strings built from several single-byte addresses.

use crate::decoder::Decoder;
use crate::layout::name_groups;
use crate::{AddressKey, CodecError};
use serde::{Deserialize, Serialize};

/// Decode every group in one batch and concatenate each group's values in
/// the order given.
pub fn compose_groups(
    decoder: &Decoder<'_>,
    groups: &[Vec<AddressKey>],
) -> Result<Vec<String>, CodecError> {
    let all: Vec<AddressKey> = groups.iter().flatten().copied().collect();
    let values = decoder.decode_keys(&all)?;

    Ok(groups
        .iter()
        .map(|group| {
            group
                .iter()
                .filter_map(|address| values.get(address))
                .map(String::as_str)
                .collect()
        })
        .collect())
}

/// The four party member names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterNames {
    pub character_1: String,
    pub character_2: String,
    pub character_3: String,
    pub character_4: String,
}

impl CharacterNames {
    /// Names in slot order.
    #[must_use]
    pub fn as_array(&self) -> [&str; 4] {
        [
            &self.character_1,
            &self.character_2,
            &self.character_3,
            &self.character_4,
        ]
    }
}

/// Decode the four 4-letter party names.
pub fn character_names(decoder: &Decoder<'_>) -> Result<CharacterNames, CodecError> {
    let mut names = compose_groups(decoder, &name_groups())?.into_iter();
    let mut next = || names.next().unwrap_or_default();
    Ok(CharacterNames {
        character_1: next(),
        character_2: next(),
        character_3: next(),
        character_4: next(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Catalog, RawByte, Snapshot};

    fn letter_catalog() -> Catalog {
        let entries: Vec<String> = name_groups()
            .iter()
            .flatten()
            .map(|a| {
                format!(
                    r#"{{ "address": "{}", "description": "name letter", "type": "lookup", "lookup": "letter" }}"#,
                    a
                )
            })
            .collect();
        let json = format!(
            r#"{{ "lookups": [{{ "key": "letter", "default": "", "map": {{
                "0x8A": "A", "0x8E": "E", "0x91": "H", "0x95": "L", "0x96": "M", "0x97": "N", "0x98": "O", "0x9C": "S", "0xFF": " "
            }} }}], "catalog": [{}] }}"#,
            entries.join(",")
        );
        Catalog::from_json(&json).expect("catalog")
    }

    fn spell(word: &str) -> Vec<RawByte> {
        word.chars()
            .map(|c| match c {
                'A' => RawByte(0x8A),
                'E' => RawByte(0x8E),
                'H' => RawByte(0x91),
                'L' => RawByte(0x95),
                'M' => RawByte(0x96),
                'N' => RawByte(0x97),
                'O' => RawByte(0x98),
                'S' => RawByte(0x9C),
                _ => RawByte(0xFF),
            })
            .collect()
    }

    #[test]
    fn names_concatenate_in_address_order() {
        let catalog = letter_catalog();
        let words = ["ANNE", "MOE", "LEO", "ASH"];
        let snapshot = Snapshot::from_bytes(
            name_groups()
                .into_iter()
                .zip(words)
                .flat_map(|(group, word)| group.into_iter().zip(spell(&format!("{:<4}", word)))),
        );

        let names = character_names(&Decoder::new(&catalog, &snapshot)).expect("names");
        assert_eq!(names.as_array(), ["ANNE", "MOE ", "LEO ", "ASH "]);

        let json = serde_json::to_value(&names).expect("json");
        assert_eq!(json["character_1"], "ANNE");
    }

    #[test]
    fn compose_fails_like_decode() {
        let catalog = letter_catalog();
        let snapshot = Snapshot::new();
        let err = character_names(&Decoder::new(&catalog, &snapshot)).expect_err("empty");
        assert!(matches!(err, CodecError::MissingSnapshotAddress(_)));
    }
}

//! # Bestiary Index
//!
//! Location to monster lists, plus the derived reverse index from normalized
//! monster name to the locations it appears in.
//!
//! Misses are answered with sentinel values, never errors, and a batch
//! location query always answers every name it was given.

use crate::files::{describe_read_error, read_limited};
use crate::primitives::{MAX_MONSTER_QUERY, MONSTER_NOT_FOUND, NO_MONSTERS_HERE, SINGULAR_EXCEPTIONS};
use crate::CodecError;
use std::collections::BTreeMap;
use std::path::Path;

/// Forward and reverse monster indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bestiary {
    forward: BTreeMap<String, Vec<String>>,
    reverse: BTreeMap<String, Vec<String>>,
}

impl Bestiary {
    /// Load a bestiary file.
    pub fn load(path: &Path) -> Result<Self, CodecError> {
        let load_err = |reason: String| CodecError::BestiaryLoad {
            path: path.display().to_string(),
            reason,
        };

        let data = read_limited(path).map_err(|e| load_err(describe_read_error(&e)))?;
        let bestiary = Self::from_slice(&data).map_err(|e| match e {
            CodecError::Serialization(reason) => load_err(reason),
            other => other,
        })?;

        tracing::info!(
            "Loaded bestiary from {}: {} locations, {} monsters",
            path.display(),
            bestiary.forward.len(),
            bestiary.reverse.len()
        );
        Ok(bestiary)
    }

    /// Parse a bestiary from JSON bytes.
    ///
    /// Locations whose value is not a list, and list items that are not
    /// strings, are skipped.
    pub fn from_slice(data: &[u8]) -> Result<Self, CodecError> {
        let raw: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(data).map_err(|e| CodecError::Serialization(e.to_string()))?;

        let mut forward = BTreeMap::new();
        for (location, value) in raw {
            let serde_json::Value::Array(items) = value else {
                tracing::warn!("Skipping bestiary location {:?}: not a list", location);
                continue;
            };
            let monsters: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(name) => Some(name),
                    _ => None,
                })
                .collect();
            forward.insert(location, monsters);
        }

        Ok(Self::from_locations(forward))
    }

    /// Parse a bestiary from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Self::from_slice(json.as_bytes())
    }

    /// Build both indices from a location map.
    pub fn from_locations(forward: BTreeMap<String, Vec<String>>) -> Self {
        let mut reverse: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (location, monsters) in &forward {
            for monster in monsters {
                let locations = reverse.entry(normalize(monster)).or_default();
                if !locations.contains(location) {
                    locations.push(location.clone());
                }
            }
        }
        Self { forward, reverse }
    }

    /// Monsters found at an exact location name.
    ///
    /// An unknown location, or one with no listed monsters, yields
    /// `["no monsters here"]`.
    pub fn monsters_at(&self, location: &str) -> Vec<String> {
        match self.forward.get(location) {
            Some(monsters) if !monsters.is_empty() => monsters.clone(),
            _ => {
                tracing::warn!("No bestiary entry for location {:?}", location);
                vec![NO_MONSTERS_HERE.to_string()]
            }
        }
    }

    /// Locations for one monster name, after singularizing and normalizing.
    pub fn locations_for(&self, name: &str) -> Option<&[String]> {
        self.reverse.get(&singularize(name)).map(Vec::as_slice)
    }

    /// Locations for each requested monster.
    ///
    /// Keys are the caller's inputs, stringified if they are not strings.
    /// Unknown or non-string names map to `["monster not found"]`.
    pub fn locations_of(
        &self,
        monsters: &[serde_json::Value],
    ) -> Result<BTreeMap<String, Vec<String>>, CodecError> {
        if monsters.len() > MAX_MONSTER_QUERY {
            return Err(CodecError::InvalidRequest(format!(
                "monster count {} exceeds maximum {}",
                monsters.len(),
                MAX_MONSTER_QUERY
            )));
        }

        let mut found = BTreeMap::new();
        for monster in monsters {
            let (key, locations) = match monster {
                serde_json::Value::String(name) => (name.clone(), self.locations_for(name)),
                other => (other.to_string(), None),
            };
            let locations = locations.map(<[String]>::to_vec).unwrap_or_else(|| {
                tracing::warn!("Monster {:?} not in bestiary", key);
                vec![MONSTER_NOT_FOUND.to_string()]
            });
            found.insert(key, locations);
        }
        Ok(found)
    }

    /// Number of locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Check whether the bestiary has no locations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// Lowercase and keep only alphanumeric characters.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalize, then drop one trailing `s` unless the name is a known exception.
pub fn singularize(name: &str) -> String {
    let normalized = normalize(name);
    if SINGULAR_EXCEPTIONS.contains(&normalized.as_str()) {
        return normalized;
    }
    match normalized.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => normalized,
    }
}

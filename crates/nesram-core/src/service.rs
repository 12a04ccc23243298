//! # RAM Service
//!
//! The application root for every codec operation.
//!
//! `RamService` owns the data file paths and the process-lifetime caches.
//! The catalog and the bestiary are static files: each is parsed at most once,
//! on first use, even when several threads race for it. A failed load is not
//! cached, so fixing the file and retrying works without a restart. The
//! snapshot is never cached; every operation reads it fresh.

use crate::bestiary::Bestiary;
use crate::catalog::{Catalog, EntrySummary};
use crate::composite::{self, CharacterNames};
use crate::decoder::{DecodedValues, Decoder};
use crate::dump;
use crate::encoder::{self, WriteReceipt, WriteValue};
use crate::primitives::{BESTIARY_FILE, CATALOG_FILE, SNAPSHOT_FILE};
use crate::reorder::{self, Permutation};
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::{AddressKey, CodecError};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// DATA PATHS
// =============================================================================

/// Locations of the three data files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub catalog: PathBuf,
    pub snapshot: PathBuf,
    pub bestiary: PathBuf,
}

impl DataPaths {
    /// Standard file names inside one ramdisk directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            catalog: dir.join(CATALOG_FILE),
            snapshot: dir.join(SNAPSHOT_FILE),
            bestiary: dir.join(BESTIARY_FILE),
        }
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// Shared entry point for reads, writes, reorders, and bestiary queries.
#[derive(Debug)]
pub struct RamService {
    paths: DataPaths,
    store: SnapshotStore,
    catalog: OnceCell<Arc<Catalog>>,
    bestiary: OnceCell<Arc<Bestiary>>,
}

impl RamService {
    /// Create a service over `paths`. Nothing is read until first use.
    pub fn new(paths: DataPaths) -> Self {
        let store = SnapshotStore::new(paths.snapshot.clone());
        Self {
            paths,
            store,
            catalog: OnceCell::new(),
            bestiary: OnceCell::new(),
        }
    }

    /// Use an already-parsed catalog instead of loading the file.
    #[must_use]
    pub fn with_catalog(self, catalog: Catalog) -> Self {
        Self {
            catalog: OnceCell::with_value(Arc::new(catalog)),
            ..self
        }
    }

    /// Use an already-parsed bestiary instead of loading the file.
    #[must_use]
    pub fn with_bestiary(self, bestiary: Bestiary) -> Self {
        Self {
            bestiary: OnceCell::with_value(Arc::new(bestiary)),
            ..self
        }
    }

    /// The configured data file paths.
    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// The catalog, loading it on first use.
    pub fn catalog(&self) -> Result<Arc<Catalog>, CodecError> {
        self.catalog
            .get_or_try_init(|| Catalog::load(&self.paths.catalog).map(Arc::new))
            .cloned()
    }

    /// The bestiary, loading it on first use.
    pub fn bestiary(&self) -> Result<Arc<Bestiary>, CodecError> {
        self.bestiary
            .get_or_try_init(|| Bestiary::load(&self.paths.bestiary).map(Arc::new))
            .cloned()
    }

    /// Read the current snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, CodecError> {
        self.store.load()
    }

    // -------------------------------------------------------------------------
    // Memory operations
    // -------------------------------------------------------------------------

    /// Decode a batch of addresses.
    pub fn read<S: AsRef<str>>(&self, addresses: &[S]) -> Result<DecodedValues, CodecError> {
        let catalog = self.catalog()?;
        // Unknown addresses are reported even when the snapshot is unreadable
        let keys = catalog.resolve_all(addresses)?;
        let snapshot = self.snapshot()?;
        Decoder::new(&catalog, &snapshot).decode_keys(&keys)
    }

    /// Encode a batch of values and persist them.
    pub fn write<S: AsRef<str>>(
        &self,
        values: &[(S, WriteValue)],
    ) -> Result<WriteReceipt, CodecError> {
        let catalog = self.catalog()?;
        let writes = encoder::encode(&catalog, values)?;
        let snapshot = self.snapshot()?;
        self.store.apply(&snapshot, &writes)?;
        Ok(WriteReceipt {
            written: writes.len(),
        })
    }

    /// Rearrange the party stat blocks.
    pub fn reorder(&self, permutation: &Permutation) -> Result<WriteReceipt, CodecError> {
        let snapshot = self.snapshot()?;
        let writes = reorder::stage_reorder(&snapshot, permutation)?;
        self.store.apply(&snapshot, &writes)?;
        tracing::info!("Reordered party to {:?}", permutation.sources());
        Ok(WriteReceipt {
            written: writes.len(),
        })
    }

    /// Decode groups of addresses into concatenated strings.
    pub fn compose_groups(&self, groups: &[Vec<AddressKey>]) -> Result<Vec<String>, CodecError> {
        let catalog = self.catalog()?;
        let snapshot = self.snapshot()?;
        composite::compose_groups(&Decoder::new(&catalog, &snapshot), groups)
    }

    /// Decode the four party member names.
    pub fn character_names(&self) -> Result<CharacterNames, CodecError> {
        let catalog = self.catalog()?;
        let snapshot = self.snapshot()?;
        composite::character_names(&Decoder::new(&catalog, &snapshot))
    }

    /// Hex dump of the enemy region.
    pub fn enemy_dump(&self) -> Result<Vec<String>, CodecError> {
        dump::enemy_dump(&self.snapshot()?)
    }

    /// Every catalog entry in address order.
    pub fn catalog_entries(&self) -> Result<Vec<EntrySummary>, CodecError> {
        Ok(self.catalog()?.summaries())
    }

    // -------------------------------------------------------------------------
    // Bestiary
    // -------------------------------------------------------------------------

    /// Monsters at a location.
    pub fn monsters_at(&self, location: &str) -> Result<Vec<String>, CodecError> {
        Ok(self.bestiary()?.monsters_at(location))
    }

    /// Locations for each named monster.
    pub fn locations_of(
        &self,
        monsters: &[serde_json::Value],
    ) -> Result<BTreeMap<String, Vec<String>>, CodecError> {
        self.bestiary()?.locations_of(monsters)
    }
}

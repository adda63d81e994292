//! Save/restore of the game session as a single JSON blob.
//!
//! Blob shape:
//! `{playerPosition, playerCoins[], caches{"i,j": {coins[], latLng, initialCount}}, statusText, moveHistory[]}`.
//! Every generated cache is written, not only the visible ones, so tokens
//! moved into a cache survive the cache scrolling out of view.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::GameError;
use crate::geo::LatLng;
use crate::model::{Cache, CellId, Token};

/// Named string blob storage. Browser builds use [`LocalStorage`].
pub trait BlobStore {
    fn get_blob(&self, key: &str) -> Result<Option<String>, GameError>;
    fn set_blob(&self, key: &str, value: &str) -> Result<(), GameError>;
    fn delete_blob(&self, key: &str) -> Result<(), GameError>;
}

/// `window.localStorage`.
pub struct LocalStorage {
    store: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, GameError> {
        let win = web_sys::window().ok_or_else(|| GameError::Storage("no window".into()))?;
        match win.local_storage() {
            Ok(Some(store)) => Ok(Self { store }),
            Ok(None) => Err(GameError::Storage("localStorage disabled".into())),
            Err(err) => Err(GameError::Storage(format!("{err:?}"))),
        }
    }
}

impl BlobStore for LocalStorage {
    fn get_blob(&self, key: &str) -> Result<Option<String>, GameError> {
        self.store
            .get_item(key)
            .map_err(|err| GameError::Storage(format!("{err:?}")))
    }

    fn set_blob(&self, key: &str, value: &str) -> Result<(), GameError> {
        self.store
            .set_item(key, value)
            .map_err(|err| GameError::Storage(format!("{err:?}")))
    }

    fn delete_blob(&self, key: &str) -> Result<(), GameError> {
        self.store
            .remove_item(key)
            .map_err(|err| GameError::Storage(format!("{err:?}")))
    }
}

/// In-process store for tests and for running without browser storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RefCell<HashMap<String, String>>,
}

impl BlobStore for MemoryStore {
    fn get_blob(&self, key: &str) -> Result<Option<String>, GameError> {
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn set_blob(&self, key: &str, value: &str) -> Result<(), GameError> {
        self.blobs.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_blob(&self, key: &str) -> Result<(), GameError> {
        self.blobs.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCache {
    pub coins: Vec<Token>,
    pub lat_lng: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_count: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub player_position: LatLng,
    pub player_coins: Vec<Token>,
    pub caches: BTreeMap<String, SavedCache>,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub move_history: Vec<LatLng>,
}

impl Snapshot {
    pub fn encode(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> Result<Self, GameError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn saved_cache(cache: &Cache) -> SavedCache {
        SavedCache {
            coins: cache.tokens.clone(),
            lat_lng: cache.anchor,
            initial_count: Some(cache.initial_count),
        }
    }

    /// Rebuild the caches this snapshot holds. `recount` supplies the
    /// generated pool size for entries saved without one.
    ///
    /// Every key must name a distinct cell, and that cell must contain the
    /// saved anchor; anything else is `CorruptSnapshot`.
    pub fn restore_caches(
        &self,
        board: &Board,
        recount: impl Fn(CellId) -> u32,
    ) -> Result<Vec<Cache>, GameError> {
        let mut seen = BTreeSet::new();
        let mut caches = Vec::with_capacity(self.caches.len());
        for (key, saved) in &self.caches {
            let cell: CellId = key.parse().map_err(|err: crate::model::ParseCellIdError| {
                GameError::CorruptSnapshot(err.to_string())
            })?;
            if !seen.insert(cell) {
                return Err(GameError::CorruptSnapshot(format!(
                    "cache {cell} saved twice (key {key:?})"
                )));
            }
            let anchor_cell = board.cell_at(saved.lat_lng);
            if anchor_cell != cell {
                return Err(GameError::CorruptSnapshot(format!(
                    "cache {key:?} anchored in cell {anchor_cell}"
                )));
            }
            caches.push(Cache {
                cell,
                anchor: saved.lat_lng,
                tokens: saved.coins.clone(),
                initial_count: saved.initial_count.unwrap_or_else(|| recount(cell)),
            });
        }
        Ok(caches)
    }
}

/// Write `snapshot` under `key`.
pub fn save(store: &dyn BlobStore, key: &str, snapshot: &Snapshot) -> Result<(), GameError> {
    let raw = snapshot.encode()?;
    store.set_blob(key, &raw)?;
    log::debug!("saved {} bytes under {key}", raw.len());
    Ok(())
}

/// Read the snapshot under `key`. A missing blob is `Ok(None)`; an unreadable
/// one is `Err(CorruptSnapshot)` and the caller should proceed as if absent.
pub fn load(store: &dyn BlobStore, key: &str) -> Result<Option<Snapshot>, GameError> {
    match store.get_blob(key)? {
        Some(raw) => Snapshot::decode(&raw).map(Some),
        None => Ok(None),
    }
}

pub fn clear(store: &dyn BlobStore, key: &str) -> Result<(), GameError> {
    store.delete_blob(key)
}

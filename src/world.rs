//! Deterministic cache generation, the cache store and the visibility filter.

use std::collections::{BTreeMap, BTreeSet};

use crate::board::Board;
use crate::geo::LatLng;
use crate::luck::LuckSource;
use crate::model::{Cache, CellId};

/// Live caches keyed by cell. Insertion-only outside of reset and restore.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheStore {
    caches: BTreeMap<CellId, Cache>,
}

impl CacheStore {
    pub fn get(&self, cell: CellId) -> Option<&Cache> {
        self.caches.get(&cell)
    }

    pub fn get_mut(&mut self, cell: CellId) -> Option<&mut Cache> {
        self.caches.get_mut(&cell)
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.caches.contains_key(&cell)
    }

    /// Adds `cache` unless its cell is already occupied. Returns whether it
    /// was added.
    pub fn insert(&mut self, cache: Cache) -> bool {
        if self.caches.contains_key(&cache.cell) {
            return false;
        }
        self.caches.insert(cache.cell, cache);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cache> {
        self.caches.values()
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn clear(&mut self) {
        self.caches.clear();
    }

    pub fn total_tokens(&self) -> usize {
        self.caches.values().map(Cache::len).sum()
    }

    pub fn refill_all(&mut self) {
        for cache in self.caches.values_mut() {
            cache.refill();
        }
    }
}

/// Tokens a fresh cache in `cell` starts with, in `1..=100`.
pub fn initial_token_count<L: LuckSource + ?Sized>(luck: &L, cell: CellId) -> u32 {
    (luck.luck(&cell.token_count_key()) * 100.0).floor() as u32 + 1
}

/// Decide whether `cell` holds a cache and build it if so.
pub fn roll_cache<L: LuckSource + ?Sized>(
    board: &Board,
    luck: &L,
    cell: CellId,
    spawn_probability: f64,
) -> Option<Cache> {
    if luck.luck(&cell.spawn_key()) >= spawn_probability {
        return None;
    }
    let count = initial_token_count(luck, cell);
    Some(Cache::spawn(cell, board.anchor(cell), count))
}

/// Generate caches for every not-yet-populated cell in the square
/// neighbourhood of `radius_cells` around `center`. Cells that already hold a
/// cache are left alone, so repeated calls never re-roll. Returns the cells
/// that gained a cache.
pub fn ensure_caches_in_region<L: LuckSource + ?Sized>(
    store: &mut CacheStore,
    board: &Board,
    luck: &L,
    center: LatLng,
    radius_cells: i32,
    spawn_probability: f64,
) -> Vec<CellId> {
    let mut spawned = Vec::new();
    for cell in board.cells_near(center, radius_cells) {
        if store.contains(cell) {
            continue;
        }
        if let Some(cache) = roll_cache(board, luck, cell, spawn_probability) {
            log::debug!("spawned cache {} with {} coins", cell, cache.initial_count);
            store.insert(cache);
            spawned.push(cell);
        }
    }
    spawned
}

/// Cells whose cache anchor lies within `radius_m` metres of `center`.
pub fn visible_set(store: &CacheStore, center: LatLng, radius_m: f64) -> BTreeSet<CellId> {
    store
        .iter()
        .filter(|cache| center.distance_to(&cache.anchor) <= radius_m)
        .map(|cache| cache.cell)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::luck::MurmurLuck;
    use std::collections::HashMap;

    const T: f64 = 1e-4;

    /// Fixed draws; every other key gets `fallback`.
    struct TableLuck {
        table: HashMap<&'static str, f64>,
        fallback: f64,
    }

    impl LuckSource for TableLuck {
        fn luck(&self, key: &str) -> f64 {
            self.table.get(key).copied().unwrap_or(self.fallback)
        }
    }

    fn origin() -> LatLng {
        LatLng::new(0.5e-4, 0.5e-4)
    }

    #[test]
    fn low_draw_spawns_with_salted_count() {
        let luck = TableLuck {
            table: HashMap::from([("0,0", 0.05), ("0,0,initialValue", 0.3)]),
            fallback: 0.99,
        };
        let mut store = CacheStore::default();
        let board = Board::new(T);
        let spawned = ensure_caches_in_region(&mut store, &board, &luck, origin(), 1, 0.1);
        assert_eq!(spawned, vec![CellId::new(0, 0)]);
        let cache = store.get(CellId::new(0, 0)).unwrap();
        assert_eq!(cache.initial_count, 31);
        assert_eq!(cache.len(), 31);
        assert_eq!(cache.tokens.first().map(|t| t.serial), Some(0));
        assert_eq!(cache.tokens.last().map(|t| t.serial), Some(30));
        assert!(cache.tokens.iter().all(|t| t.origin() == cache.anchor));
    }

    #[test]
    fn draw_at_threshold_does_not_spawn() {
        let luck = TableLuck {
            table: HashMap::from([("0,0", 0.1)]),
            fallback: 0.99,
        };
        let board = Board::new(T);
        assert!(roll_cache(&board, &luck, CellId::new(0, 0), 0.1).is_none());
    }

    #[test]
    fn token_counts_cover_one_to_hundred() {
        let lo = TableLuck { table: HashMap::new(), fallback: 0.0 };
        let hi = TableLuck { table: HashMap::new(), fallback: 0.999_999 };
        assert_eq!(initial_token_count(&lo, CellId::new(0, 0)), 1);
        assert_eq!(initial_token_count(&hi, CellId::new(0, 0)), 100);
    }

    #[test]
    fn regeneration_is_idempotent() {
        let mut store = CacheStore::default();
        let board = Board::new(T);
        let center = LatLng::new(36.98949379578401, -122.06277128548504);
        ensure_caches_in_region(&mut store, &board, &MurmurLuck, center, 8, 0.1);
        let first = store.clone();
        let again = ensure_caches_in_region(&mut store, &board, &MurmurLuck, center, 8, 0.1);
        assert!(again.is_empty());
        assert_eq!(store, first);
    }

    #[test]
    fn existing_cache_is_not_rerolled() {
        let mut store = CacheStore::default();
        let board = Board::new(T);
        let always = TableLuck { table: HashMap::new(), fallback: 0.0 };
        ensure_caches_in_region(&mut store, &board, &always, origin(), 0, 0.5);
        store.get_mut(CellId::new(0, 0)).unwrap().take_top();
        ensure_caches_in_region(&mut store, &board, &always, origin(), 0, 0.5);
        assert_eq!(store.get(CellId::new(0, 0)).unwrap().len(), 0);
    }

    #[test]
    fn generation_is_reproducible_across_sessions() {
        let center = LatLng::new(36.98949379578401, -122.06277128548504);
        let run = || {
            let mut store = CacheStore::default();
            let board = Board::new(T);
            ensure_caches_in_region(&mut store, &board, &MurmurLuck, center, 8, 0.1);
            store
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn spawn_rate_roughly_matches_probability() {
        let mut store = CacheStore::default();
        let board = Board::new(T);
        ensure_caches_in_region(&mut store, &board, &MurmurLuck, origin(), 30, 0.1);
        let cells = 61 * 61;
        let rate = store.len() as f64 / cells as f64;
        assert!((0.05..0.15).contains(&rate), "spawn rate {rate}");
    }

    #[test]
    fn visibility_is_a_distance_cut() {
        let mut store = CacheStore::default();
        let board = Board::new(T);
        for cell in [CellId::new(0, 0), CellId::new(0, 5), CellId::new(20, 0)] {
            store.insert(Cache::spawn(cell, board.anchor(cell), 1));
        }
        let visible = visible_set(&store, board.anchor(CellId::new(0, 0)), 60.0);
        assert_eq!(
            visible.into_iter().collect::<Vec<_>>(),
            vec![CellId::new(0, 0), CellId::new(0, 5)]
        );
        assert_eq!(store.total_tokens(), 3);
    }

    #[test]
    fn duplicate_insert_rejected() {
        let mut store = CacheStore::default();
        let cell = CellId::new(1, 1);
        assert!(store.insert(Cache::spawn(cell, LatLng::new(0.0, 0.0), 2)));
        assert!(!store.insert(Cache::spawn(cell, LatLng::new(0.0, 0.0), 9)));
        assert_eq!(store.get(cell).unwrap().len(), 2);
    }
}

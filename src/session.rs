//! The game session: the one owner of world, inventory and player state.
//!
//! Every mutation goes through a method here, and the yew reducer below is a
//! thin dispatcher over those methods. Failed operations leave the session
//! untouched and surface as a status line.

use std::collections::BTreeSet;
use std::rc::Rc;

use yew::Reducible;

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::geo::{Heading, LatLng};
use crate::luck::MurmurLuck;
use crate::model::{Cache, CellId, Inventory, Token};
use crate::persistence::Snapshot;
use crate::world::{self, CacheStore};

#[derive(Clone, Debug, PartialEq)]
pub struct GameSession {
    config: GameConfig,
    board: Board,
    caches: CacheStore,
    inventory: Inventory,
    player: LatLng,
    visible: BTreeSet<CellId>,
    history: Vec<LatLng>,
    pub status_text: String,
    pub sensor_enabled: bool,
    /// Bumped on every state change; drives autosave and redraws.
    pub revision: u64,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        let start = config.start;
        let mut session = Self {
            board: Board::new(config.tile_degrees),
            config,
            caches: CacheStore::default(),
            inventory: Inventory::default(),
            player: start,
            visible: BTreeSet::new(),
            history: vec![start],
            status_text: String::new(),
            sensor_enabled: false,
            revision: 0,
        };
        session.refresh();
        session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self) -> LatLng {
        self.player
    }

    pub fn player_cell(&self) -> CellId {
        self.board.cell_at(self.player)
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn caches(&self) -> &CacheStore {
        &self.caches
    }

    pub fn cache(&self, cell: CellId) -> Option<&Cache> {
        self.caches.get(cell)
    }

    pub fn history(&self) -> &[LatLng] {
        &self.history
    }

    pub fn is_visible(&self, cell: CellId) -> bool {
        self.visible.contains(&cell)
    }

    pub fn visible_caches(&self) -> impl Iterator<Item = &Cache> {
        self.visible.iter().filter_map(|cell| self.caches.get(*cell))
    }

    /// Cell a token was spawned in.
    pub fn origin_cell(&self, token: &Token) -> CellId {
        self.board.cell_at(token.origin())
    }

    pub fn token_label(&self, token: &Token) -> String {
        token.label(self.origin_cell(token))
    }

    /// Tokens in all caches plus those held. Transfers never change this.
    pub fn token_total(&self) -> usize {
        self.caches.total_tokens() + self.inventory.len()
    }

    /// Generate around the player and recompute what is visible.
    fn refresh(&mut self) {
        let spawned = world::ensure_caches_in_region(
            &mut self.caches,
            &self.board,
            &MurmurLuck,
            self.player,
            self.config.neighborhood_radius,
            self.config.spawn_probability,
        );
        if !spawned.is_empty() {
            log::debug!(
                "{} new caches near {}, {} known",
                spawned.len(),
                self.player_cell(),
                self.caches.len()
            );
        }
        self.visible = world::visible_set(&self.caches, self.player, self.config.visibility_radius_m);
    }

    pub fn move_to(&mut self, to: LatLng) {
        self.player = to;
        if self.history.last() != Some(&to) {
            self.history.push(to);
        }
        self.refresh();
    }

    pub fn step(&mut self, heading: Heading) {
        let (d_lat, d_lng) = heading.delta();
        let to = self.player.offset_cells(d_lat, d_lng, self.config.tile_degrees);
        self.move_to(to);
    }

    /// Move the top token of `cell`'s cache into the inventory.
    pub fn collect(&mut self, cell: CellId) -> Result<Token, GameError> {
        let player = self.player;
        let cache = self
            .caches
            .get_mut(cell)
            .ok_or(GameError::MissingCache { cell })?;
        let mut token = cache.take_top().ok_or(GameError::EmptyCache { cell })?;
        token.held_at = Some(player);
        self.inventory.push(token.clone());
        Ok(token)
    }

    /// Move the most recently collected token into `cell`'s cache.
    pub fn deposit(&mut self, cell: CellId) -> Result<Token, GameError> {
        let cache = self
            .caches
            .get_mut(cell)
            .ok_or(GameError::MissingCache { cell })?;
        let mut token = self.inventory.pop().ok_or(GameError::EmptyInventory)?;
        token.held_at = None;
        cache.put(token.clone());
        Ok(token)
    }

    /// Every known cache back to its generated pool, empty hands, back at the
    /// start with no trail.
    pub fn reset(&mut self) {
        self.caches.refill_all();
        self.inventory.clear();
        self.player = self.config.start;
        self.history = vec![self.config.start];
        self.status_text.clear();
        self.refresh();
    }

    /// Capture every generated cache, the inventory and the player.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            player_position: self.player,
            player_coins: self.inventory.tokens().to_vec(),
            caches: self
                .caches
                .iter()
                .map(|cache| (cache.cell.to_string(), Snapshot::saved_cache(cache)))
                .collect(),
            status_text: self.status_text.clone(),
            move_history: self.history.clone(),
        }
    }

    /// Replace the session's state with `snapshot`. On error nothing changes.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), GameError> {
        let restored = snapshot
            .restore_caches(&self.board, |cell| world::initial_token_count(&MurmurLuck, cell))?;
        self.caches.clear();
        for cache in restored {
            self.caches.insert(cache);
        }
        self.inventory = Inventory::from_tokens(snapshot.player_coins.clone());
        self.player = snapshot.player_position;
        self.history = if snapshot.move_history.is_empty() {
            vec![snapshot.player_position]
        } else {
            snapshot.move_history.clone()
        };
        self.status_text = snapshot.status_text.clone();
        self.refresh();
        log::info!(
            "restored {} caches and {} held coins",
            self.caches.len(),
            self.inventory.len()
        );
        Ok(())
    }
}

// ---------------- Reducer & Actions -----------------
#[derive(Clone, Debug)]
pub enum GameAction {
    Step(Heading),
    MoveTo(LatLng),
    Collect(CellId),
    Deposit(CellId),
    Reset,
    Restore(Snapshot),
    SetSensor(bool),
    SetStatus(String),
}

impl Reducible for GameSession {
    type Action = GameAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use GameAction::*;
        let mut new = (*self).clone();
        match action {
            Step(heading) => new.step(heading),
            MoveTo(to) => new.move_to(to),
            Collect(cell) => match new.collect(cell) {
                Ok(token) => {
                    new.status_text = format!("Collected coin {}", new.token_label(&token));
                }
                Err(err) => {
                    log::debug!("collect at {cell}: {err}");
                    let mut unchanged = (*self).clone();
                    unchanged.status_text = err.to_string();
                    new = unchanged;
                }
            },
            Deposit(cell) => match new.deposit(cell) {
                Ok(token) => {
                    new.status_text =
                        format!("Deposited coin {} into {}", new.token_label(&token), cell);
                }
                Err(err) => {
                    log::debug!("deposit at {cell}: {err}");
                    let mut unchanged = (*self).clone();
                    unchanged.status_text = err.to_string();
                    new = unchanged;
                }
            },
            Reset => {
                new.reset();
                log::info!("game reset");
            }
            Restore(snapshot) => {
                if let Err(err) = new.restore(&snapshot) {
                    log::warn!("{err}");
                    let mut unchanged = (*self).clone();
                    unchanged.status_text = err.to_string();
                    new = unchanged;
                }
            }
            SetSensor(on) => {
                if new.sensor_enabled == on {
                    return self;
                }
                new.sensor_enabled = on;
            }
            SetStatus(text) => {
                if new.status_text == text {
                    return self;
                }
                new.status_text = text;
            }
        }
        new.revision = self.revision.wrapping_add(1);
        Rc::new(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn session() -> GameSession {
        GameSession::new(GameConfig::default())
    }

    fn stocked_visible_cell(s: &GameSession) -> CellId {
        s.visible_caches()
            .find(|c| !c.is_empty())
            .map(|c| c.cell)
            .expect("start area has a visible cache")
    }

    /// Walk until at least one cache is visible.
    fn session_with_visible_cache() -> GameSession {
        let mut s = session();
        for _ in 0..200 {
            if s.visible_caches().any(|c| !c.is_empty()) {
                return s;
            }
            s.step(Heading::East);
        }
        panic!("no cache found along the walk");
    }

    #[test]
    fn new_session_generates_around_start() {
        let s = session();
        assert_eq!(s.player(), GameConfig::default().start);
        assert!(s.caches().len() > 0);
        assert!(s.visible_caches().all(|c| {
            s.player().distance_to(&c.anchor) <= s.config().visibility_radius_m
        }));
    }

    #[test]
    fn collect_moves_top_token_to_inventory() {
        let mut s = session_with_visible_cache();
        let cell = stocked_visible_cell(&s);
        let before = s.cache(cell).unwrap().len();
        let top = s.cache(cell).unwrap().tokens.last().cloned().unwrap();
        let got = s.collect(cell).unwrap();
        assert_eq!(got, top);
        assert_eq!(got.held_at, Some(s.player()));
        assert_eq!(s.cache(cell).unwrap().len(), before - 1);
        assert_eq!(s.inventory().tokens().last(), Some(&top));
    }

    #[test]
    fn single_token_cache_then_empty() {
        let mut s = session_with_visible_cache();
        let cell = stocked_visible_cell(&s);
        while s.cache(cell).unwrap().len() > 1 {
            s.collect(cell).unwrap();
        }
        let held = s.inventory().len();
        let last = s.collect(cell).unwrap();
        assert_eq!(last.serial, 0);
        assert_eq!(last.origin(), s.cache(cell).unwrap().anchor);
        assert_eq!(s.inventory().len(), held + 1);
        assert_eq!(s.collect(cell), Err(GameError::EmptyCache { cell }));
        assert_eq!(s.inventory().len(), held + 1);
    }

    #[test]
    fn deposit_with_empty_inventory_is_noop() {
        let mut s = session_with_visible_cache();
        let cell = stocked_visible_cell(&s);
        let before = s.cache(cell).unwrap().len();
        assert_eq!(s.deposit(cell), Err(GameError::EmptyInventory));
        assert_eq!(s.cache(cell).unwrap().len(), before);
    }

    #[test]
    fn missing_cache_reported() {
        let mut s = session();
        let nowhere = CellId::new(0, 0);
        assert_eq!(s.collect(nowhere), Err(GameError::MissingCache { cell: nowhere }));
        assert_eq!(s.deposit(nowhere), Err(GameError::MissingCache { cell: nowhere }));
    }

    #[test]
    fn deposit_is_lifo() {
        let mut s = session_with_visible_cache();
        let cell = stocked_visible_cell(&s);
        s.collect(cell).unwrap();
        let second = s.collect(cell).ok();
        let Some(second) = second else { return };
        let back = s.deposit(cell).unwrap();
        assert_eq!(back, second);
        assert_eq!(back.held_at, None);
        assert_eq!(s.cache(cell).unwrap().tokens.last(), Some(&second));
    }

    #[test]
    fn transfers_conserve_tokens() {
        let mut s = session_with_visible_cache();
        let total = s.token_total();
        let cells: Vec<CellId> = s.visible_caches().map(|c| c.cell).collect();
        for (n, cell) in cells.iter().cycle().take(60).enumerate() {
            if n % 3 == 2 {
                let _ = s.deposit(*cell);
            } else {
                let _ = s.collect(*cell);
            }
            assert_eq!(s.token_total(), total);
        }
    }

    #[test]
    fn reset_restores_pools_and_empties_inventory() {
        let mut s = session_with_visible_cache();
        let fresh = s.caches().clone();
        let cell = stocked_visible_cell(&s);
        s.collect(cell).unwrap();
        s.collect(cell).ok();
        s.step(Heading::North);
        s.step(Heading::North);
        let other: Vec<CellId> = s.visible_caches().map(|c| c.cell).collect();
        if let Some(target) = other.first() {
            let _ = s.deposit(*target);
        }
        s.reset();
        assert!(s.inventory().is_empty());
        assert_eq!(s.player(), s.config().start);
        assert_eq!(s.history(), &[s.config().start]);
        for cache in fresh.iter() {
            assert_eq!(s.cache(cache.cell), Some(cache));
        }
        for cache in s.caches().iter() {
            assert_eq!(cache.len() as u32, cache.initial_count);
        }
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut s = session_with_visible_cache();
        let cell = stocked_visible_cell(&s);
        s.collect(cell).unwrap();
        s.step(Heading::South);
        s.status_text = "saved here".into();
        let raw = s.snapshot().encode().unwrap();

        let mut restored = session();
        restored.restore(&Snapshot::decode(&raw).unwrap()).unwrap();
        assert_eq!(restored.player(), s.player());
        assert_eq!(restored.inventory(), s.inventory());
        assert_eq!(restored.history(), s.history());
        assert_eq!(restored.status_text, "saved here");
        for cache in s.visible_caches() {
            assert_eq!(restored.cache(cache.cell), Some(cache));
            assert!(restored.is_visible(cache.cell));
        }
    }

    #[test]
    fn out_of_view_changes_survive_restore() {
        let mut s = session_with_visible_cache();
        let cell = stocked_visible_cell(&s);
        s.collect(cell).unwrap();
        let left_behind = s.cache(cell).unwrap().clone();
        for _ in 0..40 {
            s.step(Heading::West);
        }
        assert!(!s.is_visible(cell));

        let mut restored = session();
        restored.restore(&s.snapshot()).unwrap();
        assert_eq!(restored.cache(cell), Some(&left_behind));
        assert_eq!(restored.token_total(), s.token_total());
    }

    #[test]
    fn corrupt_restore_leaves_state_alone() {
        let mut s = session();
        let before = s.clone();
        let mut snap = s.snapshot();
        snap.caches.insert("bogus".into(), Snapshot::saved_cache(s.caches().iter().next().unwrap()));
        assert!(s.restore(&snap).is_err());
        assert_eq!(s, before);
    }

    #[test]
    fn reducer_reports_failures_without_mutating() {
        let s = Rc::new(session());
        let after = s.clone().reduce(GameAction::Deposit(CellId::new(0, 0)));
        assert_eq!(after.caches(), s.caches());
        assert_eq!(after.inventory(), s.inventory());
        assert!(!after.status_text.is_empty());
        assert_eq!(after.revision, s.revision + 1);
    }

    #[test]
    fn reducer_step_moves_one_cell() {
        let s = Rc::new(session());
        let start_cell = s.player_cell();
        let after = s.reduce(GameAction::Step(Heading::North));
        assert_eq!(after.player_cell(), CellId::new(start_cell.i + 1, start_cell.j));
        assert_eq!(after.history().len(), 2);
    }

    #[test]
    fn unchanged_sensor_flag_keeps_revision() {
        let s = Rc::new(session());
        let after = s.clone().reduce(GameAction::SetSensor(false));
        assert!(Rc::ptr_eq(&s, &after));
    }

    #[test]
    fn two_keys_for_one_cell_are_rejected_on_restore() {
        let mut s = session_with_visible_cache();
        let cell = stocked_visible_cell(&s);
        s.collect(cell).unwrap();
        let mut snap = s.snapshot();
        let mut twin = snap.caches[&cell.to_string()].clone();
        twin.coins.truncate(1);
        snap.caches.insert(format!("{}, {}", cell.i, cell.j), twin);

        let mut target = session();
        let before = target.clone();
        assert!(matches!(target.restore(&snap), Err(GameError::CorruptSnapshot(_))));
        assert_eq!(target, before);
    }

    fn heading(n: u8) -> Heading {
        match n % 4 {
            0 => Heading::North,
            1 => Heading::South,
            2 => Heading::East,
            _ => Heading::West,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn any_transfer_sequence_conserves_tokens(
            ops in prop::collection::vec((any::<bool>(), any::<u8>()), 0..120),
        ) {
            let mut s = session();
            let cells: Vec<CellId> = s.caches().iter().map(|c| c.cell).collect();
            prop_assume!(!cells.is_empty());
            let total = s.token_total();
            for (collect, pick) in ops {
                let cell = cells[pick as usize % cells.len()];
                let held = s.inventory().len();
                if collect {
                    let ok = s.collect(cell).is_ok();
                    prop_assert_eq!(s.inventory().len(), held + ok as usize);
                } else {
                    let ok = s.deposit(cell).is_ok();
                    prop_assert_eq!(s.inventory().len() + ok as usize, held);
                }
                prop_assert_eq!(s.token_total(), total);
            }
        }

        #[test]
        fn restore_of_snapshot_reproduces_session(
            ops in prop::collection::vec((0u8..3, any::<u8>()), 0..60),
        ) {
            let mut s = session();
            for (kind, pick) in ops {
                let cells: Vec<CellId> = s.caches().iter().map(|c| c.cell).collect();
                let cell = cells[pick as usize % cells.len()];
                match kind {
                    0 => { let _ = s.collect(cell); }
                    1 => { let _ = s.deposit(cell); }
                    _ => s.step(heading(pick)),
                }
            }
            let raw = s.snapshot().encode().unwrap();
            let mut restored = session();
            restored.restore(&Snapshot::decode(&raw).unwrap()).unwrap();
            prop_assert_eq!(restored.caches(), s.caches());
            prop_assert_eq!(restored.inventory(), s.inventory());
            prop_assert_eq!(restored.player(), s.player());
            prop_assert_eq!(restored.history(), s.history());
            prop_assert_eq!(restored.token_total(), s.token_total());
        }
    }
}

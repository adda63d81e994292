//! Core data models for the geocache game.
//! Cells, tokens ("coins"), caches and the player's inventory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geo::LatLng;

/// Discrete grid identity: `(floor(lat / tile), floor(lng / tile))`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId {
    pub i: i32,
    pub j: i32,
}

impl CellId {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Luck key deciding whether a cache spawns here.
    pub fn spawn_key(&self) -> String {
        format!("{},{}", self.i, self.j)
    }

    /// Luck key deciding how many tokens a fresh cache holds.
    pub fn token_count_key(&self) -> String {
        format!("{},{},initialValue", self.i, self.j)
    }
}

/// Stringified form used as the cache-store and snapshot key: `"i,j"`.
impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.i, self.j)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseCellIdError(pub String);

impl fmt::Display for ParseCellIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cell key {:?}", self.0)
    }
}

impl FromStr for CellId {
    type Err = ParseCellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCellIdError(s.to_string());
        let (i, j) = s.split_once(',').ok_or_else(err)?;
        let i = i.trim().parse::<i32>().map_err(|_| err())?;
        let j = j.trim().parse::<i32>().map_err(|_| err())?;
        Ok(CellId { i, j })
    }
}

/// Geographic rectangle covered by one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl CellBounds {
    pub fn center(&self) -> LatLng {
        LatLng {
            lat: (self.south_west.lat + self.north_east.lat) / 2.0,
            lng: (self.south_west.lng + self.north_east.lng) / 2.0,
        }
    }
}

/// A collectible token. `serial` is unique only within the cache that spawned
/// it; the origin never changes after spawn.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub serial: u32,
    pub origin_lat: f64,
    pub origin_lng: f64,
    /// Where the player last picked this token up. Display only, never saved.
    #[serde(skip)]
    pub held_at: Option<LatLng>,
}

impl Token {
    pub fn new(serial: u32, origin: LatLng) -> Self {
        Self {
            serial,
            origin_lat: origin.lat,
            origin_lng: origin.lng,
            held_at: None,
        }
    }

    pub fn origin(&self) -> LatLng {
        LatLng::new(self.origin_lat, self.origin_lng)
    }

    /// Human-readable identity, `"i:j#serial"`, using the origin's cell.
    pub fn label(&self, origin_cell: CellId) -> String {
        format!("{}:{}#{}", origin_cell.i, origin_cell.j, self.serial)
    }
}

// Identity is serial + origin; `held_at` is presentation data.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.serial == other.serial
            && self.origin_lat == other.origin_lat
            && self.origin_lng == other.origin_lng
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cache {
    pub cell: CellId,
    /// Coordinate the cache was generated at; origin of its spawned tokens.
    pub anchor: LatLng,
    /// Last element is the top of the pool.
    pub tokens: Vec<Token>,
    /// Pool size at creation, used by reset.
    pub initial_count: u32,
}

impl Cache {
    /// New cache holding `count` tokens with serials `0..count`.
    pub fn spawn(cell: CellId, anchor: LatLng, count: u32) -> Self {
        Self {
            cell,
            anchor,
            tokens: fresh_tokens(anchor, count),
            initial_count: count,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn take_top(&mut self) -> Option<Token> {
        self.tokens.pop()
    }

    pub fn put(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Restore the pool to exactly what generation produced.
    pub fn refill(&mut self) {
        self.tokens = fresh_tokens(self.anchor, self.initial_count);
    }
}

fn fresh_tokens(anchor: LatLng, count: u32) -> Vec<Token> {
    (0..count).map(|serial| Token::new(serial, anchor)).collect()
}

/// Tokens currently held by the player. Last element is the most recently
/// collected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inventory {
    tokens: Vec<Token>,
}

impl Inventory {
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn pop(&mut self) -> Option<Token> {
        self.tokens.pop()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_key_round_trips_through_display() {
        for cell in [CellId::new(0, 0), CellId::new(-3, 17), CellId::new(369894, -1220628)] {
            let parsed: CellId = cell.to_string().parse().unwrap();
            assert_eq!(parsed, cell);
        }
    }

    #[test]
    fn malformed_cell_keys_rejected() {
        assert!("".parse::<CellId>().is_err());
        assert!("1".parse::<CellId>().is_err());
        assert!("a,b".parse::<CellId>().is_err());
    }

    #[test]
    fn luck_keys() {
        let c = CellId::new(4, -2);
        assert_eq!(c.spawn_key(), "4,-2");
        assert_eq!(c.token_count_key(), "4,-2,initialValue");
    }

    #[test]
    fn spawn_emits_exactly_count_tokens() {
        let anchor = LatLng::new(0.5e-4, 0.5e-4);
        let cache = Cache::spawn(CellId::new(0, 0), anchor, 3);
        let serials: Vec<u32> = cache.tokens.iter().map(|t| t.serial).collect();
        assert_eq!(serials, vec![0, 1, 2]);
        assert!(cache.tokens.iter().all(|t| t.origin() == anchor));
    }

    #[test]
    fn cache_pool_is_lifo() {
        let mut cache = Cache::spawn(CellId::new(0, 0), LatLng::new(0.0, 0.0), 2);
        assert_eq!(cache.take_top().map(|t| t.serial), Some(1));
        assert_eq!(cache.take_top().map(|t| t.serial), Some(0));
        assert!(cache.take_top().is_none());
    }

    #[test]
    fn refill_restores_initial_pool() {
        let mut cache = Cache::spawn(CellId::new(1, 1), LatLng::new(1.0, 1.0), 4);
        let original = cache.tokens.clone();
        cache.take_top();
        cache.put(Token::new(9, LatLng::new(5.0, 5.0)));
        cache.refill();
        assert_eq!(cache.tokens, original);
    }

    #[test]
    fn token_equality_ignores_held_at() {
        let a = Token::new(2, LatLng::new(1.0, 2.0));
        let mut b = a.clone();
        b.held_at = Some(LatLng::new(3.0, 4.0));
        assert_eq!(a, b);
    }

    #[test]
    fn token_json_shape() {
        let t = Token::new(7, LatLng::new(1.5, -2.5));
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v, serde_json::json!({"serial": 7, "originLat": 1.5, "originLng": -2.5}));
    }
}

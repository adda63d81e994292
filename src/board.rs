//! Grid index: continuous coordinates to discrete cells.

use crate::geo::LatLng;
use crate::model::{CellBounds, CellId};

/// Cell containing `(lat, lng)` for a grid of `tile_degrees`.
/// Uses floor (toward negative infinity) so negative coordinates stay stable.
pub fn cell_of(lat: f64, lng: f64, tile_degrees: f64) -> CellId {
    CellId {
        i: (lat / tile_degrees).floor() as i32,
        j: (lng / tile_degrees).floor() as i32,
    }
}

/// Session-owned grid of fixed tile size.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    tile_degrees: f64,
}

impl Board {
    pub fn new(tile_degrees: f64) -> Self {
        Self { tile_degrees }
    }

    pub fn cell_at(&self, point: LatLng) -> CellId {
        cell_of(point.lat, point.lng, self.tile_degrees)
    }

    pub fn bounds(&self, cell: CellId) -> CellBounds {
        let t = self.tile_degrees;
        CellBounds {
            south_west: LatLng::new(cell.i as f64 * t, cell.j as f64 * t),
            north_east: LatLng::new((cell.i as f64 + 1.0) * t, (cell.j as f64 + 1.0) * t),
        }
    }

    /// Coordinate a cache in `cell` is generated at.
    pub fn anchor(&self, cell: CellId) -> LatLng {
        self.bounds(cell).center()
    }

    /// The `(2 * radius + 1)^2` cells centred on the cell holding `point`,
    /// row by row from the south-west corner. Near the edge of the `i32`
    /// range the square is cut off rather than wrapping.
    pub fn cells_near(&self, point: LatLng, radius: i32) -> Vec<CellId> {
        let center = self.cell_at(point);
        let radius = radius.max(0);
        let rows = center.i.saturating_sub(radius)..=center.i.saturating_add(radius);
        let cols = center.j.saturating_sub(radius)..=center.j.saturating_add(radius);
        let side = 2 * radius as usize + 1;
        let mut cells = Vec::with_capacity(side * side);
        for i in rows {
            for j in cols.clone() {
                cells.push(CellId::new(i, j));
            }
        }
        cells
    }
}

// Map camera: projection between screen pixels and coordinates.
use crate::geo::LatLng;

#[derive(Debug, Clone)]
pub struct Camera {
    /// Screen pixels per grid cell.
    pub zoom: f64,
    /// Map centre when not following the player.
    pub center: Option<LatLng>,
    pub panning: bool,
    pub last_x: f64,
    pub last_y: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 28.0,
            center: None,
            panning: false,
            last_x: 0.0,
            last_y: 0.0,
        }
    }
}

pub const MIN_ZOOM: f64 = 6.0;
pub const MAX_ZOOM: f64 = 80.0;

impl Camera {
    /// Centre of the view, following `player` unless panned away.
    pub fn view_center(&self, player: LatLng) -> LatLng {
        self.center.unwrap_or(player)
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn focus(&mut self, at: LatLng) {
        self.center = Some(at);
    }

    pub fn follow_player(&mut self) {
        self.center = None;
    }

    /// Drag the view by a pixel delta.
    pub fn pan_pixels(&mut self, player: LatLng, tile: f64, dx: f64, dy: f64) {
        let c = self.view_center(player);
        self.center = Some(LatLng::new(
            c.lat + dy / self.zoom * tile,
            c.lng - dx / self.zoom * tile,
        ));
    }

    pub fn to_screen(&self, p: LatLng, player: LatLng, tile: f64, w: f64, h: f64) -> (f64, f64) {
        let c = self.view_center(player);
        let x = (p.lng - c.lng) / tile * self.zoom + w * 0.5;
        let y = -(p.lat - c.lat) / tile * self.zoom + h * 0.5;
        (x, y)
    }

    pub fn to_world(&self, x: f64, y: f64, player: LatLng, tile: f64, w: f64, h: f64) -> LatLng {
        let c = self.view_center(player);
        LatLng::new(
            c.lat - (y - h * 0.5) / self.zoom * tile,
            c.lng + (x - w * 0.5) / self.zoom * tile,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: f64 = 1e-4;

    #[test]
    fn player_is_drawn_at_screen_centre() {
        let cam = Camera::default();
        let p = LatLng::new(36.9895, -122.0628);
        assert_eq!(cam.to_screen(p, p, T, 800.0, 600.0), (400.0, 300.0));
    }

    #[test]
    fn north_is_up() {
        let cam = Camera::default();
        let p = LatLng::new(0.0, 0.0);
        let (_, y) = cam.to_screen(LatLng::new(T, 0.0), p, T, 100.0, 100.0);
        assert!(y < 50.0);
    }

    #[test]
    fn screen_world_inverse() {
        let mut cam = Camera::default();
        cam.focus(LatLng::new(1.0, 2.0));
        let player = LatLng::new(0.0, 0.0);
        let q = cam.to_world(123.0, 45.0, player, T, 640.0, 480.0);
        let (x, y) = cam.to_screen(q, player, T, 640.0, 480.0);
        assert!((x - 123.0).abs() < 1e-6 && (y - 45.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = Camera::default();
        cam.zoom_by(100.0);
        assert_eq!(cam.zoom, MAX_ZOOM);
        cam.zoom_by(0.0001);
        assert_eq!(cam.zoom, MIN_ZOOM);
    }
}

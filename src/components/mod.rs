pub mod app;
pub mod cache_popup;
pub mod camera_controls;
pub mod controls_panel;
pub mod intro_overlay;
pub mod inventory_panel;
pub mod legend;
pub mod legend_panel;
pub mod map_view;
pub mod settings_modal;

// Shared map palette (canvas + legend).
pub const COLOR_BACKGROUND: &str = "#0e1116";
pub const COLOR_GRID: &str = "#1f252e";
pub const COLOR_PLAYER: &str = "#58a6ff";
pub const COLOR_CACHE: &str = "#d4af37";
pub const COLOR_CACHE_EMPTY: &str = "#3c4454";
pub const COLOR_SELECTED: &str = "#2ea043";
pub const COLOR_TRAIL: &str = "#f0883e";
pub const COLOR_RADIUS: &str = "rgba(88,166,255,0.35)";

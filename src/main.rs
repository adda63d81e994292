mod board;
mod components;
mod config;
mod error;
mod geo;
mod luck;
mod model;
mod persistence;
mod session;
mod state;
mod util;
mod world;

use components::app::App;

fn main() {
    util::init_logging();
    log::info!("starting geocache");
    yew::Renderer::<App>::new().render();
}

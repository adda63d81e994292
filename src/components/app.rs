use super::{
    cache_popup::CachePopup, controls_panel::ControlsPanel, intro_overlay::IntroOverlay,
    inventory_panel::InventoryPanel, legend_panel::LegendPanel, map_view::MapView,
    settings_modal::SettingsModal,
};
use crate::config::GameConfig;
use crate::geo::{Heading, LatLng};
use crate::model::CellId;
use crate::persistence::{self, BlobStore, LocalStorage, MemoryStore};
use crate::session::{GameAction, GameSession};
use crate::state::GeoWatch;
use yew::prelude::*;

const INTRO_SEEN_KEY: &str = "geocache_intro_seen";
const SHOW_TRAIL_KEY: &str = "geocache_setting_show_trail";
const SHOW_RADIUS_KEY: &str = "geocache_setting_show_radius";

fn open_store() -> Box<dyn BlobStore> {
    match LocalStorage::open() {
        Ok(store) => Box::new(store),
        Err(err) => {
            log::warn!("{err}; progress will not survive a reload");
            Box::new(MemoryStore::default())
        }
    }
}

fn read_flag(store: &dyn BlobStore, key: &str, default: bool) -> bool {
    match store.get_blob(key) {
        Ok(Some(v)) => v == "1" || v == "true",
        _ => default,
    }
}

fn write_flag(store: &dyn BlobStore, key: &str, on: bool) {
    if let Err(err) = store.set_blob(key, if on { "1" } else { "0" }) {
        log::warn!("could not store {key}: {err}");
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let store = use_memo((), |_| open_store());
    let session = {
        let store = store.clone();
        use_reducer(move || GameSession::new(GameConfig::load(&**store)))
    };
    let selected = use_state(|| None::<CellId>);
    let focus = use_state(|| None::<LatLng>);
    let open_settings = use_state(|| false);
    let show_intro = use_state(|| store.get_blob(INTRO_SEEN_KEY).ok().flatten().is_none());
    let show_trail = use_state(|| read_flag(&**store, SHOW_TRAIL_KEY, true));
    let show_radius = use_state(|| read_flag(&**store, SHOW_RADIUS_KEY, false));
    let watch = use_mut_ref(|| None::<GeoWatch>);

    // Restore the saved game once
    {
        let session = session.clone();
        let store = store.clone();
        use_effect_with((), move |_| {
            let key = session.config().storage_key.clone();
            match persistence::load(&**store, &key) {
                Ok(Some(snapshot)) => session.dispatch(GameAction::Restore(snapshot)),
                Ok(None) => log::info!("no saved game, starting fresh"),
                Err(err) => {
                    log::warn!("{err}; starting fresh");
                    session.dispatch(GameAction::SetStatus(
                        "Saved game could not be read; started a new one.".to_string(),
                    ));
                }
            }
            || ()
        });
    }
    // Autosave after every change
    {
        let session = session.clone();
        let store = store.clone();
        use_effect_with(session.revision, move |rev| {
            if *rev > 0 {
                let key = &session.config().storage_key;
                if let Err(err) = persistence::save(&**store, key, &session.snapshot()) {
                    log::warn!("autosave failed: {err}");
                }
            }
            || ()
        });
    }
    // Live position subscription follows the sensor flag
    {
        let session = session.clone();
        let watch = watch.clone();
        use_effect_with(session.sensor_enabled, move |on| {
            if *on {
                let on_fix = {
                    let session = session.clone();
                    Callback::from(move |p: LatLng| session.dispatch(GameAction::MoveTo(p)))
                };
                let on_error = {
                    let session = session.clone();
                    Callback::from(move |msg: String| session.dispatch(GameAction::SetStatus(msg)))
                };
                match GeoWatch::start(on_fix, on_error) {
                    Ok(w) => *watch.borrow_mut() = Some(w),
                    Err(msg) => {
                        log::warn!("{msg}");
                        session.dispatch(GameAction::SetSensor(false));
                        session.dispatch(GameAction::SetStatus(msg));
                    }
                }
            } else {
                watch.borrow_mut().take();
            }
            || ()
        });
    }
    // Persist view toggles
    {
        let store = store.clone();
        use_effect_with((*show_trail, *show_radius), move |(trail, radius)| {
            write_flag(&**store, SHOW_TRAIL_KEY, *trail);
            write_flag(&**store, SHOW_RADIUS_KEY, *radius);
            || ()
        });
    }

    let on_step = {
        let session = session.clone();
        Callback::from(move |heading: Heading| session.dispatch(GameAction::Step(heading)))
    };
    let on_select = {
        let selected = selected.clone();
        Callback::from(move |cell: Option<CellId>| selected.set(cell))
    };
    let on_collect = {
        let session = session.clone();
        Callback::from(move |cell: CellId| session.dispatch(GameAction::Collect(cell)))
    };
    let on_deposit = {
        let session = session.clone();
        Callback::from(move |cell: CellId| session.dispatch(GameAction::Deposit(cell)))
    };
    let close_popup = {
        let selected = selected.clone();
        Callback::from(move |()| selected.set(None))
    };
    let on_focus = {
        let focus = focus.clone();
        Callback::from(move |at: LatLng| focus.set(Some(at)))
    };
    let on_recenter = {
        let focus = focus.clone();
        Callback::from(move |()| focus.set(None))
    };
    let toggle_sensor = {
        let session = session.clone();
        Callback::from(move |()| session.dispatch(GameAction::SetSensor(!session.sensor_enabled)))
    };
    let open_settings_cb = {
        let open_settings = open_settings.clone();
        Callback::from(move |()| open_settings.set(true))
    };
    let close_settings_cb = {
        let open_settings = open_settings.clone();
        Callback::from(move |()| open_settings.set(false))
    };
    let toggle_trail_cb = {
        let show_trail = show_trail.clone();
        Callback::from(move |()| show_trail.set(!*show_trail))
    };
    let toggle_radius_cb = {
        let show_radius = show_radius.clone();
        Callback::from(move |()| show_radius.set(!*show_radius))
    };
    let reset_cb = {
        let session = session.clone();
        let store = store.clone();
        let selected = selected.clone();
        let focus = focus.clone();
        let open_settings = open_settings.clone();
        Callback::from(move |()| {
            if let Err(err) = persistence::clear(&**store, &session.config().storage_key) {
                log::warn!("could not delete saved game: {err}");
            }
            session.dispatch(GameAction::Reset);
            selected.set(None);
            focus.set(None);
            open_settings.set(false);
        })
    };
    let hide_intro_cb = {
        let show_intro = show_intro.clone();
        let store = store.clone();
        Callback::from(move |()| {
            show_intro.set(false);
            if let Err(err) = store.set_blob(INTRO_SEEN_KEY, "1") {
                log::warn!("could not store {INTRO_SEEN_KEY}: {err}");
            }
        })
    };
    let show_help_cb = {
        let show_intro = show_intro.clone();
        Callback::from(move |()| show_intro.set(true))
    };

    let visible_count = session.visible_caches().count();

    html! {<div style="position:relative; width:100vw; height:100vh; overflow:hidden;">
        <MapView
            session={session.clone()}
            selected={*selected}
            focus={*focus}
            on_recenter={on_recenter}
            show_trail={*show_trail}
            show_radius={*show_radius}
            on_select={on_select}
            on_step={on_step.clone()}
        />
        <InventoryPanel session={session.clone()} on_focus={on_focus} />
        <ControlsPanel on_step={on_step} sensor_enabled={session.sensor_enabled} on_toggle_sensor={toggle_sensor} on_show_help={show_help_cb} on_open_settings={open_settings_cb} />
        <LegendPanel visible_caches={visible_count} show_trail={*show_trail} />
        <CachePopup session={session.clone()} cell={*selected} on_collect={on_collect} on_deposit={on_deposit} on_close={close_popup} />
        <SettingsModal show={*open_settings} on_close={close_settings_cb} show_trail={*show_trail} on_toggle_trail={toggle_trail_cb} show_radius={*show_radius} on_toggle_radius={toggle_radius_cb} on_reset={reset_cb} />
        <IntroOverlay show={*show_intro} hide_intro={hide_intro_cb} />
    </div>}
}

// Live position updates via the browser geolocation API.
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use yew::Callback;

use crate::geo::LatLng;

/// An active `watchPosition` subscription. Dropping it unsubscribes.
pub struct GeoWatch {
    id: i32,
    geolocation: web_sys::Geolocation,
    _on_fix: Closure<dyn FnMut(JsValue)>,
    _on_error: Closure<dyn FnMut(JsValue)>,
}

impl GeoWatch {
    pub fn start(on_fix: Callback<LatLng>, on_error: Callback<String>) -> Result<Self, String> {
        let win = web_sys::window().ok_or("no window")?;
        let geolocation = win
            .navigator()
            .geolocation()
            .map_err(|e| format!("geolocation unavailable: {e:?}"))?;
        let fix_cb = Closure::wrap(Box::new(move |pos: JsValue| match read_position(&pos) {
            Some(p) => on_fix.emit(p),
            None => log::warn!("position fix without coordinates"),
        }) as Box<dyn FnMut(JsValue)>);
        let error_cb = Closure::wrap(Box::new(move |err: JsValue| {
            let msg = js_sys::Reflect::get(&err, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
                .unwrap_or_else(|| "position unavailable".to_string());
            on_error.emit(msg);
        }) as Box<dyn FnMut(JsValue)>);
        let id = geolocation
            .watch_position_with_error_callback(
                fix_cb.as_ref().unchecked_ref(),
                Some(error_cb.as_ref().unchecked_ref()),
            )
            .map_err(|e| format!("watchPosition failed: {e:?}"))?;
        log::info!("geolocation watch {id} started");
        Ok(Self {
            id,
            geolocation,
            _on_fix: fix_cb,
            _on_error: error_cb,
        })
    }
}

impl Drop for GeoWatch {
    fn drop(&mut self) {
        self.geolocation.clear_watch(self.id);
        log::info!("geolocation watch {} stopped", self.id);
    }
}

fn read_position(pos: &JsValue) -> Option<LatLng> {
    let coords = js_sys::Reflect::get(pos, &JsValue::from_str("coords")).ok()?;
    let lat = js_sys::Reflect::get(&coords, &JsValue::from_str("latitude")).ok()?.as_f64()?;
    let lng = js_sys::Reflect::get(&coords, &JsValue::from_str("longitude")).ok()?.as_f64()?;
    Some(LatLng::new(lat, lng))
}

use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use yew::prelude::*;

use super::camera_controls::CameraControls;
use super::{
    COLOR_BACKGROUND, COLOR_CACHE, COLOR_CACHE_EMPTY, COLOR_GRID, COLOR_PLAYER, COLOR_RADIUS,
    COLOR_SELECTED, COLOR_TRAIL,
};
use crate::geo::{Heading, LatLng};
use crate::model::CellId;
use crate::session::GameSession;
use crate::state::Camera;

/// Metres per degree of latitude, for sizing the visibility ring.
const METRES_PER_DEGREE: f64 = 111_320.0;

#[derive(Properties, PartialEq, Clone)]
pub struct MapViewProps {
    pub session: UseReducerHandle<GameSession>,
    pub selected: Option<CellId>,
    pub focus: Option<LatLng>,
    /// The view went back to following the player.
    pub on_recenter: Callback<()>,
    pub show_trail: bool,
    pub show_radius: bool,
    pub on_select: Callback<Option<CellId>>,
    pub on_step: Callback<Heading>,
}

#[derive(Clone, Copy, Default)]
struct ViewFlags {
    selected: Option<CellId>,
    show_trail: bool,
    show_radius: bool,
}

fn heading_for_key(key: &str) -> Option<Heading> {
    match key {
        "ArrowUp" | "w" | "W" => Some(Heading::North),
        "ArrowDown" | "s" | "S" => Some(Heading::South),
        "ArrowLeft" | "a" | "A" => Some(Heading::West),
        "ArrowRight" | "d" | "D" => Some(Heading::East),
        _ => None,
    }
}

fn draw_map(ctx: &CanvasRenderingContext2d, w: f64, h: f64, cam: &Camera, session: &GameSession, flags: ViewFlags) {
    let tile = session.config().tile_degrees;
    let player = session.player();
    let screen = |p: LatLng| cam.to_screen(p, player, tile, w, h);

    ctx.set_fill_style_str(COLOR_BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);

    // Grid lines, only when cells are big enough to read.
    if cam.zoom >= 10.0 {
        let sw = cam.to_world(0.0, h, player, tile, w, h);
        let ne = cam.to_world(w, 0.0, player, tile, w, h);
        ctx.set_stroke_style_str(COLOR_GRID);
        ctx.set_line_width(1.0);
        let (i0, i1) = ((sw.lat / tile).floor() as i64, (ne.lat / tile).ceil() as i64);
        let (j0, j1) = ((sw.lng / tile).floor() as i64, (ne.lng / tile).ceil() as i64);
        for i in i0..=i1 {
            let (_, y) = screen(LatLng::new(i as f64 * tile, 0.0));
            ctx.begin_path();
            ctx.move_to(0.0, y);
            ctx.line_to(w, y);
            ctx.stroke();
        }
        for j in j0..=j1 {
            let (x, _) = screen(LatLng::new(0.0, j as f64 * tile));
            ctx.begin_path();
            ctx.move_to(x, 0.0);
            ctx.line_to(x, h);
            ctx.stroke();
        }
    }

    if flags.show_radius {
        let r_px = session.config().visibility_radius_m / METRES_PER_DEGREE / tile * cam.zoom;
        let (px, py) = screen(player);
        ctx.begin_path();
        ctx.set_stroke_style_str(COLOR_RADIUS);
        ctx.set_line_width(2.0);
        ctx.arc(px, py, r_px, 0.0, std::f64::consts::PI * 2.0).ok();
        ctx.stroke();
    }

    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_font("11px sans-serif");
    let margin = 0.12 * cam.zoom;
    for cache in session.visible_caches() {
        let bounds = session.board().bounds(cache.cell);
        let (x0, y0) = screen(bounds.south_west);
        let (x1, y1) = screen(bounds.north_east);
        let (rx, ry, rw, rh) = (x0 + margin, y1 + margin, (x1 - x0) - 2.0 * margin, (y0 - y1) - 2.0 * margin);
        ctx.set_fill_style_str(if cache.is_empty() { COLOR_CACHE_EMPTY } else { COLOR_CACHE });
        ctx.fill_rect(rx, ry, rw, rh);
        if flags.selected == Some(cache.cell) {
            ctx.set_stroke_style_str(COLOR_SELECTED);
            ctx.set_line_width(3.0);
            ctx.stroke_rect(rx - 2.0, ry - 2.0, rw + 4.0, rh + 4.0);
        }
        if cam.zoom >= 20.0 {
            ctx.set_fill_style_str("#0e1116");
            ctx.fill_text(&cache.len().to_string(), (x0 + x1) * 0.5, (y0 + y1) * 0.5).ok();
        }
    }

    if flags.show_trail && session.history().len() >= 2 {
        ctx.begin_path();
        ctx.set_stroke_style_str(COLOR_TRAIL);
        ctx.set_line_width(2.0);
        for (k, p) in session.history().iter().enumerate() {
            let (x, y) = screen(*p);
            if k == 0 {
                ctx.move_to(x, y);
            } else {
                ctx.line_to(x, y);
            }
        }
        ctx.stroke();
    }

    let (px, py) = screen(player);
    ctx.begin_path();
    ctx.set_fill_style_str(COLOR_PLAYER);
    ctx.arc(px, py, (0.3 * cam.zoom).max(5.0), 0.0, std::f64::consts::PI * 2.0).ok();
    ctx.fill();
    ctx.set_stroke_style_str("#1f6feb");
    ctx.set_line_width(2.0);
    ctx.stroke();
}

#[function_component(MapView)]
pub fn map_view(props: &MapViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let camera = use_mut_ref(Camera::default);
    let draw_ref = use_mut_ref(|| None::<Rc<dyn Fn()>>);
    let session_ref = use_mut_ref(|| props.session.clone());
    let flags_ref = use_mut_ref(ViewFlags::default);

    // Effect: refresh session handle and flags, then redraw
    {
        let session_ref = session_ref.clone();
        let flags_ref = flags_ref.clone();
        let handle = props.session.clone();
        let draw_ref = draw_ref.clone();
        let deps = (props.session.revision, props.selected, props.show_trail, props.show_radius);
        use_effect_with(deps, move |(_, selected, show_trail, show_radius)| {
            *session_ref.borrow_mut() = handle;
            *flags_ref.borrow_mut() = ViewFlags {
                selected: *selected,
                show_trail: *show_trail,
                show_radius: *show_radius,
            };
            if let Some(f) = &*draw_ref.borrow() {
                f();
            }
            || ()
        });
    }
    // Effect: focus a coordinate or follow the player
    {
        let camera = camera.clone();
        let draw_ref = draw_ref.clone();
        use_effect_with(props.focus, move |focus| {
            match focus {
                Some(p) => camera.borrow_mut().focus(*p),
                None => camera.borrow_mut().follow_player(),
            }
            if let Some(f) = &*draw_ref.borrow() {
                f();
            }
            || ()
        });
    }
    // Main mount effect (canvas, listeners)
    {
        let canvas_ref = canvas_ref.clone();
        let camera = camera.clone();
        let draw_ref_setup = draw_ref.clone();
        let session_ref = session_ref.clone();
        let flags_ref = flags_ref.clone();
        let on_select = props.on_select.clone();
        let on_step = props.on_step.clone();

        use_effect_with((), move |_| {
            let window = web_sys::window();
            let canvas = canvas_ref.cast::<HtmlCanvasElement>();
            let (Some(window), Some(canvas)) = (window, canvas) else {
                log::warn!("map canvas unavailable");
                return Box::new(|| ()) as Box<dyn FnOnce()>;
            };

            let fit_canvas = {
                let canvas = canvas.clone();
                let window = window.clone();
                move || {
                    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
                    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
                    canvas.set_width(width.max(0.0) as u32);
                    canvas.set_height(height.max(0.0) as u32);
                }
            };
            fit_canvas();

            let draw_closure: Rc<dyn Fn()> = {
                let canvas = canvas.clone();
                let camera = camera.clone();
                let session_ref = session_ref.clone();
                let flags_ref = flags_ref.clone();
                Rc::new(move || {
                    if !canvas.is_connected() {
                        return;
                    }
                    let Some(ctx) = canvas
                        .get_context("2d")
                        .ok()
                        .flatten()
                        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
                    else {
                        return;
                    };
                    let cam = camera.borrow();
                    let handle = session_ref.borrow();
                    let flags = *flags_ref.borrow();
                    draw_map(&ctx, canvas.width() as f64, canvas.height() as f64, &cam, &handle, flags);
                })
            };
            *draw_ref_setup.borrow_mut() = Some(draw_closure.clone());
            (draw_closure)();

            let resize_cb = {
                let draw = draw_closure.clone();
                Closure::wrap(Box::new(move || {
                    fit_canvas();
                    draw();
                }) as Box<dyn FnMut()>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .ok();

            let mousedown_cb = {
                let camera = camera.clone();
                let session_ref = session_ref.clone();
                let canvas = canvas.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    if e.button() == 0 {
                        let cam = camera.borrow();
                        let handle = session_ref.borrow().clone();
                        let tile = handle.config().tile_degrees;
                        let at = cam.to_world(
                            e.offset_x() as f64,
                            e.offset_y() as f64,
                            handle.player(),
                            tile,
                            canvas.width() as f64,
                            canvas.height() as f64,
                        );
                        let cell = handle.board().cell_at(at);
                        if handle.is_visible(cell) {
                            on_select.emit(Some(cell));
                        } else {
                            on_select.emit(None);
                        }
                    } else {
                        let mut cam = camera.borrow_mut();
                        cam.panning = true;
                        cam.last_x = e.client_x() as f64;
                        cam.last_y = e.client_y() as f64;
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref())
                .ok();

            let mousemove_cb = {
                let camera = camera.clone();
                let session_ref = session_ref.clone();
                let draw = draw_closure.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    let mut cam = camera.borrow_mut();
                    if !cam.panning {
                        return;
                    }
                    let (x, y) = (e.client_x() as f64, e.client_y() as f64);
                    let (dx, dy) = (x - cam.last_x, y - cam.last_y);
                    cam.last_x = x;
                    cam.last_y = y;
                    let handle = session_ref.borrow().clone();
                    cam.pan_pixels(handle.player(), handle.config().tile_degrees, dx, dy);
                    drop(cam);
                    draw();
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref())
                .ok();

            let mouseup_cb = {
                let camera = camera.clone();
                Closure::wrap(Box::new(move |_e: web_sys::MouseEvent| {
                    camera.borrow_mut().panning = false;
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref())
                .ok();

            let contextmenu_cb = Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                e.prevent_default();
            }) as Box<dyn FnMut(_)>);
            canvas
                .add_event_listener_with_callback("contextmenu", contextmenu_cb.as_ref().unchecked_ref())
                .ok();

            let wheel_cb = {
                let camera = camera.clone();
                let draw = draw_closure.clone();
                Closure::wrap(Box::new(move |e: web_sys::WheelEvent| {
                    e.prevent_default();
                    let factor = if e.delta_y() < 0.0 { 1.1 } else { 1.0 / 1.1 };
                    camera.borrow_mut().zoom_by(factor);
                    draw();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref())
                .ok();

            let keydown_cb = Closure::wrap(Box::new(move |e: web_sys::KeyboardEvent| {
                if let Some(heading) = heading_for_key(&e.key()) {
                    e.prevent_default();
                    on_step.emit(heading);
                }
            }) as Box<dyn FnMut(_)>);
            window
                .add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref())
                .ok();

            Box::new(move || {
                let _ = window.remove_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
                let _ = window.remove_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref());
                let _ = window.remove_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref());
                let _ = window.remove_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref());
                let _ = canvas.remove_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref());
                let _ = canvas.remove_event_listener_with_callback("contextmenu", contextmenu_cb.as_ref().unchecked_ref());
                let _ = canvas.remove_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref());
                *draw_ref_setup.borrow_mut() = None;
            }) as Box<dyn FnOnce()>
        });
    }

    let zoom_cb = |factor: f64| {
        let camera = camera.clone();
        let draw_ref = draw_ref.clone();
        Callback::from(move |()| {
            camera.borrow_mut().zoom_by(factor);
            if let Some(f) = &*draw_ref.borrow() {
                f();
            }
        })
    };
    let center_cb = {
        let camera = camera.clone();
        let draw_ref = draw_ref.clone();
        let on_recenter = props.on_recenter.clone();
        Callback::from(move |()| {
            camera.borrow_mut().follow_player();
            if let Some(f) = &*draw_ref.borrow() {
                f();
            }
            on_recenter.emit(());
        })
    };

    html! {<>
        <canvas ref={canvas_ref} id="map-canvas" style="display:block; width:100%; height:100%;"></canvas>
        <CameraControls on_zoom_in={zoom_cb(1.25)} on_zoom_out={zoom_cb(0.8)} on_center={center_cb} />
    </>}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_and_wasd_keys_map_to_headings() {
        assert_eq!(heading_for_key("ArrowUp"), Some(Heading::North));
        assert_eq!(heading_for_key("a"), Some(Heading::West));
        assert_eq!(heading_for_key("D"), Some(Heading::East));
        assert_eq!(heading_for_key("s"), Some(Heading::South));
        assert_eq!(heading_for_key("Enter"), None);
    }
}

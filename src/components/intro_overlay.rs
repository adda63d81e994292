use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct IntroOverlayProps {
    pub show: bool,
    pub hide_intro: Callback<()>,
}

#[function_component(IntroOverlay)]
pub fn intro_overlay(props: &IntroOverlayProps) -> Html {
    if !props.show {
        return html! {};
    }
    let hide_cb = props.hide_intro.clone();
    let start_btn = Callback::from(move |_| hide_cb.emit(()));
    html! {
        <div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.87); border:2px solid #30363d; padding:28px 36px; border-radius:14px; max-width:520px; width:90%; box-shadow:0 0 0 1px #1a1f24, 0 6px 18px rgba(0,0,0,0.6); font-size:14px; line-height:1.4; z-index:40;">
            <h2 style="margin:0 0 12px 0; font-size:22px; color:#d4af37; text-align:center;">{"Geocoin Caches"}</h2>
            <p style="margin:4px 0 10px 0; text-align:center; opacity:0.85;">{"Walk the world, pick up coins, leave them somewhere new."}</p>
            <ul style="margin:0 0 12px 18px; padding:0; list-style:disc; display:flex; flex-direction:column; gap:4px;">
                <li>{"Gold squares are caches near you; click one to open it."}</li>
                <li>{"Collect takes the top coin; Deposit drops your most recent coin."}</li>
                <li>{"Every coin remembers the cache it came from (i:j#serial)."}</li>
                <li>{"Move with the arrow buttons, arrow keys, or WASD."}</li>
                <li>{"Turn on live position to play with your device's location."}</li>
                <li>{"Click a coin in your inventory to see where it came from."}</li>
                <li>{"Progress is saved automatically in this browser."}</li>
            </ul>
            <div style="display:flex; gap:12px; justify-content:center; margin-top:8px;">
                <button onclick={start_btn}>{"Start"}</button>
            </div>
        </div>
    }
}

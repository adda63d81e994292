use yew::prelude::*;

use crate::geo::LatLng;
use crate::session::GameSession;
use crate::util::format_coord;

#[derive(Properties, PartialEq, Clone)]
pub struct InventoryPanelProps {
    pub session: UseReducerHandle<GameSession>,
    /// Centre the map on a coin's origin.
    pub on_focus: Callback<LatLng>,
}

#[function_component]
pub fn InventoryPanel(props: &InventoryPanelProps) -> Html {
    let session = &*props.session;
    let row_style = "display:flex; align-items:center; gap:8px;";
    let label_style = "flex:1; font-weight:500;";
    let value_style = "min-width:70px; text-align:right; font-variant-numeric:tabular-nums; font-weight:600;";
    let coins = session.inventory().tokens();

    html! {
        <div style="position:absolute; top:12px; left:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:10px 14px; min-width:230px; max-width:280px; display:flex; flex-direction:column; gap:10px; font-size:14px;">
            <div style={row_style}>
                <span style={format!("{} color:#d4af37;", label_style)}>{"Coins held"}</span>
                <span style={format!("{} color:#d4af37;", value_style)}>{ coins.len() }</span>
            </div>
            <div style={row_style}>
                <span style={format!("{} color:#58a6ff;", label_style)}>{"Position"}</span>
                <span style="font-size:12px; color:#58a6ff;">{ format_coord(session.player()) }</span>
            </div>
            <div style="display:flex; flex-direction:column; gap:2px; font-family:monospace; font-size:12px; max-height:180px; overflow-y:auto;">
                { for coins.iter().rev().map(|t| {
                    let origin = t.origin();
                    let cb = props.on_focus.clone();
                    html!{ <button style="text-align:left; padding:1px 4px;" title="Show where this coin came from" onclick={Callback::from(move |_| cb.emit(origin))}>{ session.token_label(t) }</button> }
                }) }
            </div>
            { if session.status_text.is_empty() { html!{} } else { html!{
                <div style="font-size:12px; line-height:1.3; background:#1c2128; border:1px solid #30363d; padding:4px 6px; border-radius:6px;">{ session.status_text.clone() }</div>
            } } }
        </div>
    }
}

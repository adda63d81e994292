use yew::prelude::*;

use crate::model::CellId;
use crate::session::GameSession;
use crate::util::{format_coord, format_distance};

/// How many of a cache's top coins the popup lists.
const LISTED_COINS: usize = 8;

#[derive(Properties, PartialEq, Clone)]
pub struct CachePopupProps {
    pub session: UseReducerHandle<GameSession>,
    pub cell: Option<CellId>,
    pub on_collect: Callback<CellId>,
    pub on_deposit: Callback<CellId>,
    pub on_close: Callback<()>,
}

#[function_component]
pub fn CachePopup(props: &CachePopupProps) -> Html {
    let Some(cell) = props.cell else {
        return html! {};
    };
    let session = &*props.session;
    // Caches that fall out of range close their popup.
    let Some(cache) = session.cache(cell).filter(|_| session.is_visible(cell)) else {
        return html! {};
    };

    let collect_cb = {
        let cb = props.on_collect.clone();
        Callback::from(move |_| cb.emit(cell))
    };
    let deposit_cb = {
        let cb = props.on_deposit.clone();
        Callback::from(move |_| cb.emit(cell))
    };
    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let distance = session.player().distance_to(&cache.anchor);
    let held = session.inventory().len();

    html! {<div style="position:absolute; left:50%; bottom:12px; transform:translateX(-50%); background:rgba(22,27,34,0.95); border:1px solid #30363d; border-radius:8px; padding:12px 16px; min-width:280px; max-width:360px; font-size:13px; display:flex; flex-direction:column; gap:8px;">
        <div style="display:flex; justify-content:space-between; align-items:center;">
            <span style="font-weight:600; font-size:15px;">{ format!("Cache {}:{}", cell.i, cell.j) }</span>
            <button onclick={close_cb} style="padding:2px 8px;">{"×"}</button>
        </div>
        <div style="color:#8b949e; font-size:12px;">{ format!("{} · {} away", format_coord(cache.anchor), format_distance(distance)) }</div>
        <div>{ format!("{} coin(s) here", cache.len()) }</div>
        <div style="display:flex; flex-direction:column; gap:2px; font-family:monospace; font-size:12px; max-height:140px; overflow-y:auto;">
            { for cache.tokens.iter().rev().take(LISTED_COINS).map(|t| html!{ <span>{ session.token_label(t) }</span> }) }
            { if cache.len() > LISTED_COINS { html!{ <span style="opacity:0.6;">{ format!("… {} more", cache.len() - LISTED_COINS) }</span> } } else { html!{} } }
        </div>
        <div style="display:flex; gap:8px;">
            <button onclick={collect_cb} disabled={cache.is_empty()} style="flex:1;">{"Collect"}</button>
            <button onclick={deposit_cb} disabled={session.inventory().is_empty()} style="flex:1;">{ format!("Deposit ({held})") }</button>
        </div>
    </div>}
}

use super::legend::LegendRow;
use super::{COLOR_CACHE, COLOR_CACHE_EMPTY, COLOR_PLAYER, COLOR_SELECTED, COLOR_TRAIL};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct LegendPanelProps {
    pub visible_caches: usize,
    pub show_trail: bool,
}

#[function_component]
pub fn LegendPanel(props: &LegendPanelProps) -> Html {
    html! {<div style="position:absolute; right:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:170px;">
        <div style="font-weight:600; margin-bottom:4px;">{"Legend"}</div>
        <div style="font-size:11px; color:#8b949e; margin-bottom:6px;">{ format!("{} cache(s) in range", props.visible_caches) }</div>
        <LegendRow color={COLOR_PLAYER} label="You" round={true} />
        <LegendRow color={COLOR_CACHE} label="Cache with coins" />
        <LegendRow color={COLOR_CACHE_EMPTY} label="Empty cache" />
        <LegendRow color={COLOR_SELECTED} label="Selected" />
        { if props.show_trail { html!{ <LegendRow color={COLOR_TRAIL} label="Movement history" /> } } else { html!{} } }
    </div>}
}

use yew::prelude::*;

use crate::geo::Heading;

#[derive(Properties, PartialEq, Clone)]
pub struct ControlsPanelProps {
    pub on_step: Callback<Heading>,
    pub sensor_enabled: bool,
    pub on_toggle_sensor: Callback<()>,
    pub on_show_help: Callback<()>,
    pub on_open_settings: Callback<()>,
}

#[function_component]
pub fn ControlsPanel(props: &ControlsPanelProps) -> Html {
    let step = |heading: Heading| {
        let cb = props.on_step.clone();
        Callback::from(move |_: MouseEvent| cb.emit(heading))
    };
    let sensor_cb = {
        let cb = props.on_toggle_sensor.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let help_cb = {
        let cb = props.on_show_help.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let settings_cb = {
        let cb = props.on_open_settings.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let sensor_label = if props.sensor_enabled { "🌐 Live position: on" } else { "🌐 Live position: off" };
    html! {<div style="position:absolute; top:12px; right:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:200px; display:flex; flex-direction:column; gap:6px;">
        <div style="display:grid; grid-template-columns:repeat(3, 1fr); gap:4px;">
            <span></span>
            <button onclick={step(Heading::North)}>{"⬆"}</button>
            <span></span>
            <button onclick={step(Heading::West)}>{"⬅"}</button>
            <span></span>
            <button onclick={step(Heading::East)}>{"➡"}</button>
            <span></span>
            <button onclick={step(Heading::South)}>{"⬇"}</button>
            <span></span>
        </div>
        <button onclick={sensor_cb}>{ sensor_label }</button>
        <button onclick={settings_cb}>{"Settings"}</button>
        <button onclick={help_cb}>{"Help"}</button>
        <div style="font-size:11px; opacity:0.7;">{"Arrow keys / WASD move one cell"}</div>
    </div>}
}

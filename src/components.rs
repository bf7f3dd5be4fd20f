//! Pure Yew view components for the timer UI.
//!
//! These components hold no timer state; they render from props and report
//! clicks through callbacks.

use crate::hooks::TimeField;
use std::rc::Rc;
use timer_widget::config::QUICK_PRESET_MINUTES;
use timer_widget::format::format_stopwatch;
use timer_widget::{LapRow, Mode};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct TabBarProps {
    pub active: Mode,
    pub on_select: Callback<Mode>,
}

#[function_component(TabBar)]
pub fn tab_bar(props: &TabBarProps) -> Html {
    let tab = |mode: Mode, label: &'static str| {
        let on_select = props.on_select.clone();
        let selected = props.active == mode;
        html! {
            <button
                id={format!("tab-{}", mode)}
                class="tab"
                role="tab"
                aria-selected={selected.to_string()}
                aria-controls={format!("panel-{}", mode)}
                onclick={Callback::from(move |_| on_select.emit(mode))}
            >
                { label }
            </button>
        }
    };

    html! {
        <div class="tabs" role="tablist" aria-label="Timer Tabs">
            { tab(Mode::Stopwatch, "Stopwatch") }
            { tab(Mode::Countdown, "Countdown") }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StopwatchReadoutProps {
    /// `HH:MM:SS.cc`
    pub text: String,
}

/// Big stopwatch readout with the hundredths rendered smaller.
#[function_component(StopwatchReadout)]
pub fn stopwatch_readout(props: &StopwatchReadoutProps) -> Html {
    let (clock, centis) = props
        .text
        .split_once('.')
        .unwrap_or((props.text.as_str(), "00"));
    html! {
        <div id="sw-readout" class="readout" aria-live="off">
            { clock }{ "." }<span class="ms">{ centis }</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct LapListProps {
    /// Newest first.
    pub rows: Rc<Vec<LapRow>>,
    /// `HH:MM:SS.cc`
    pub total: String,
}

/// Renders the lap table: lap number, split, and running total.
#[function_component(LapList)]
pub fn lap_list(props: &LapListProps) -> Html {
    html! {
        <div class="laps" aria-live="off">
            <div class="laps-header">
                <span>{ "Laps" }</span>
                <span id="sw-total" aria-label="Total elapsed">{ format!("Total: {}", props.total) }</span>
            </div>
            <div id="lap-list" class="lap-list" aria-label="Lap list">
                { props.rows.iter().map(render_lap_row).collect::<Html>() }
            </div>
        </div>
    }
}

fn render_lap_row(row: &LapRow) -> Html {
    html! {
        <div class="lap-item" key={row.number}>
            <span>{ format!("#{}", row.number) }</span>
            <strong>{ format_stopwatch(row.split) }</strong>
            <span>{ format_stopwatch(row.total) }</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TimeFieldInputProps {
    pub id: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub text: String,
    pub oninput: Callback<InputEvent>,
    pub onblur: Callback<FocusEvent>,
    pub onkeydown: Callback<KeyboardEvent>,
}

impl TimeFieldInputProps {
    pub fn for_field(
        id: &'static str,
        label: &'static str,
        placeholder: &'static str,
        field: &TimeField,
    ) -> Self {
        Self {
            id,
            label,
            placeholder,
            text: field.text.clone(),
            oninput: field.oninput.clone(),
            onblur: field.onblur.clone(),
            onkeydown: field.onkeydown.clone(),
        }
    }
}

#[function_component(TimeFieldInput)]
pub fn time_field_input(props: &TimeFieldInputProps) -> Html {
    html! {
        <input
            id={props.id}
            class="time-input"
            type="text"
            inputmode="numeric"
            pattern="[0-9]*"
            aria-label={props.label}
            placeholder={props.placeholder}
            autocomplete="off"
            value={props.text.clone()}
            oninput={props.oninput.clone()}
            onblur={props.onblur.clone()}
            onkeydown={props.onkeydown.clone()}
        />
    }
}

#[derive(Properties, PartialEq)]
pub struct QuickPresetsProps {
    /// Receives the preset length in minutes.
    pub on_pick: Callback<u64>,
}

#[function_component(QuickPresets)]
pub fn quick_presets(props: &QuickPresetsProps) -> Html {
    html! {
        <div class="quick-chips" aria-label="Quick set">
            { QUICK_PRESET_MINUTES.iter().map(|&minutes| {
                let on_pick = props.on_pick.clone();
                html! {
                    <button class="chip" key={minutes}
                        onclick={Callback::from(move |_| on_pick.emit(minutes))}>
                        { format!("{} min", minutes) }
                    </button>
                }
            }).collect::<Html>() }
        </div>
    }
}

/// Keyboard hint under the stopwatch controls.
#[function_component(ShortcutHelp)]
pub fn shortcut_help() -> Html {
    html! {
        <p class="helper">
            <span class="kb">
                <span class="kbd">{ "Space" }</span>{ " Start/Pause " }
                <span class="kbd">{ "L" }</span>{ " Lap " }
                <span class="kbd">{ "R" }</span>{ " Reset" }
            </span>
        </p>
    }
}

//! Main module for the timer app using Yew.
//! Wires the controllers to component state, persisted preferences and
//! keyboard shortcuts.

use log::warn;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use timer_widget::browser::{AnimationFrames, BrowserAlert, LocalStorage, PerformanceClock};
use timer_widget::format::{format_countdown, format_stopwatch};
use timer_widget::input::{read_fields, Field};
use timer_widget::shortcuts::{is_text_field, stopwatch_shortcut, Shortcut};
use timer_widget::{
    AlertSink, CountdownController, DisplaySink, DurationInput, LapRow, Mode, Preferences,
    StopwatchController, TimerState,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use yew::prelude::*;

mod components;
mod hooks;

use components::{
    LapList, QuickPresets, ShortcutHelp, StopwatchReadout, TabBar, TimeFieldInput,
    TimeFieldInputProps,
};
use hooks::use_time_field;

// ──────────────────────────────────────────────────────────────────────────────
// Sinks bridging the controllers into component state

/// Display sink that writes the readout (and lap list) into Yew state.
struct StateDisplay {
    text: UseStateHandle<String>,
    laps: Option<UseStateHandle<Rc<Vec<LapRow>>>>,
}

impl DisplaySink for StateDisplay {
    fn render(&mut self, text: &str) {
        self.text.set(text.to_owned());
    }

    fn render_laps(&mut self, rows: &[LapRow]) {
        if let Some(laps) = &self.laps {
            laps.set(Rc::new(rows.to_vec()));
        }
    }
}

/// Browser feedback plus the panel's "finished" highlight.
struct PanelAlert {
    browser: BrowserAlert,
    finished: UseStateHandle<bool>,
}

impl AlertSink for PanelAlert {
    fn signal_completion(&mut self) {
        self.finished.set(true);
        self.browser.signal_completion();
    }
}

type Stopwatch = StopwatchController<PerformanceClock, AnimationFrames, StateDisplay>;
type Countdown = CountdownController<PerformanceClock, AnimationFrames, StateDisplay, PanelAlert>;
type Store = Preferences<LocalStorage>;

// ──────────────────────────────────────────────────────────────────────────────
// Helper functions

fn field_slot(field: Field) -> usize {
    match field {
        Field::Hours => 0,
        Field::Minutes => 1,
        Field::Seconds => 2,
    }
}

fn committed_input(texts: &[String; 3]) -> DurationInput {
    read_fields(&texts[0], &texts[1], &texts[2])
}

/// Start the countdown. A zero input runs for the fallback minute, and the
/// fields are rewritten to show it.
fn start_countdown(
    countdown: &Rc<RefCell<Countdown>>,
    committed: &Rc<RefCell<[String; 3]>>,
    prefs: &Rc<RefCell<Store>>,
    set_fields: &[Callback<String>; 3],
) {
    let from_idle = countdown.borrow().state() == TimerState::Idle;
    let was_zero = committed_input(&committed.borrow()).is_zero();
    let Some(target) = countdown.borrow_mut().start() else {
        return;
    };
    if from_idle && was_zero {
        let input = DurationInput::from_duration(target);
        let texts = input.field_texts();
        for (set, text) in set_fields.iter().zip(texts.iter()) {
            set.emit(text.clone());
        }
        *committed.borrow_mut() = texts;
        prefs.borrow_mut().set_countdown_input(input);
        countdown.borrow_mut().configure(input);
    }
}

// ──────────────────────────────────────────────────────────────────────────────

/// Primary application component wiring state, effects, and UI elements.
#[function_component(App)]
fn app() -> Html {
    let prefs: Rc<RefCell<Store>> = use_mut_ref(|| Preferences::new(LocalStorage::new()));
    let mode = {
        let prefs = prefs.clone();
        use_state(move || prefs.borrow().active_mode())
    };
    // Read by the document key listener, which outlives any single render.
    let active_mode = use_mut_ref(|| *mode);
    let force_update = use_force_update();

    // --- Stopwatch ---
    let sw_text = use_state_eq(|| format_stopwatch(Duration::ZERO));
    let sw_laps = use_state_eq(|| Rc::new(Vec::<LapRow>::new()));
    let stopwatch: Rc<RefCell<Stopwatch>> = {
        let display = StateDisplay {
            text: sw_text.clone(),
            laps: Some(sw_laps.clone()),
        };
        use_mut_ref(move || {
            StopwatchController::new(PerformanceClock::new(), AnimationFrames::new(), display)
        })
    };

    // --- Countdown ---
    let saved_input = {
        let prefs = prefs.clone();
        *use_state(move || prefs.borrow().countdown_input())
    };
    let initial_texts: [String; 3] = saved_input
        .map(|input| input.field_texts())
        .unwrap_or_default();
    let committed = {
        let initial_texts = initial_texts.clone();
        use_mut_ref(move || initial_texts)
    };
    let cd_text = use_state_eq(|| format_countdown(saved_input.unwrap_or_default().as_duration()));
    let cd_finished = use_state_eq(|| false);
    let beep_on = use_state(|| true);
    let countdown: Rc<RefCell<Countdown>> = {
        let display = StateDisplay {
            text: cd_text.clone(),
            laps: None,
        };
        let finished = cd_finished.clone();
        use_mut_ref(move || {
            let alert = PanelAlert {
                browser: BrowserAlert::new(true),
                finished,
            };
            let mut countdown = CountdownController::new(
                PerformanceClock::new(),
                AnimationFrames::new(),
                display,
                alert,
            );
            countdown.configure(saved_input.unwrap_or_default());
            countdown
        })
    };

    // Committed field edits are persisted and staged on the countdown.
    let on_field_commit = {
        let committed = committed.clone();
        let countdown = countdown.clone();
        let prefs = prefs.clone();
        Callback::from(move |(field, text): (Field, String)| {
            let input = {
                let mut texts = committed.borrow_mut();
                texts[field_slot(field)] = text;
                committed_input(&texts)
            };
            prefs.borrow_mut().set_countdown_input(input);
            countdown.borrow_mut().configure(input);
        })
    };
    let [h_text, m_text, s_text] = initial_texts;
    let hours = use_time_field(h_text, Field::Hours, on_field_commit.clone());
    let minutes = use_time_field(m_text, Field::Minutes, on_field_commit.clone());
    let seconds = use_time_field(s_text, Field::Seconds, on_field_commit);
    let set_fields = [
        hours.set_text.clone(),
        minutes.set_text.clone(),
        seconds.set_text.clone(),
    ];

    // --- Keyboard shortcuts (stopwatch tab only) ---
    {
        let stopwatch = stopwatch.clone();
        let active_mode = active_mode.clone();
        let force_update = force_update.clone();
        use_effect_with((), move |_| {
            let document = gloo_utils::document();
            let listener = Closure::<dyn FnMut(KeyboardEvent)>::new(move |e: KeyboardEvent| {
                let focused_tag = gloo_utils::document()
                    .active_element()
                    .map(|el| el.tag_name())
                    .unwrap_or_default();
                // Keep Space from scrolling the page.
                if e.code() == "Space" && focused_tag.eq_ignore_ascii_case("BODY") {
                    e.prevent_default();
                }
                if *active_mode.borrow() != Mode::Stopwatch {
                    return;
                }
                let Some(shortcut) =
                    stopwatch_shortcut(&e.code(), &e.key(), is_text_field(&focused_tag))
                else {
                    return;
                };
                e.prevent_default();
                {
                    let mut sw = stopwatch.borrow_mut();
                    match shortcut {
                        Shortcut::Toggle => {
                            sw.toggle();
                        }
                        Shortcut::Lap => {
                            sw.lap();
                        }
                        Shortcut::Reset => {
                            sw.reset();
                        }
                    }
                }
                force_update.force_update();
            });
            if let Err(e) = document
                .add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref())
            {
                warn!("keyboard shortcuts unavailable: {:?}", e);
            }
            move || {
                let _ = document.remove_event_listener_with_callback(
                    "keydown",
                    listener.as_ref().unchecked_ref(),
                );
            }
        });
    }

    // --- Callbacks ---
    let on_select_tab = {
        let mode = mode.clone();
        let active_mode = active_mode.clone();
        let prefs = prefs.clone();
        Callback::from(move |selected: Mode| {
            *active_mode.borrow_mut() = selected;
            prefs.borrow_mut().set_active_mode(selected);
            mode.set(selected);
        })
    };

    // Runs a stopwatch command, then re-renders for the button states.
    let sw_command = |command: fn(&mut Stopwatch)| {
        let stopwatch = stopwatch.clone();
        let force_update = force_update.clone();
        Callback::from(move |_: MouseEvent| {
            command(&mut stopwatch.borrow_mut());
            force_update.force_update();
        })
    };
    let on_sw_start = sw_command(|sw| {
        sw.start();
    });
    let on_sw_pause = sw_command(|sw| {
        sw.pause();
    });
    let on_sw_lap = sw_command(|sw| {
        sw.lap();
    });
    let on_sw_reset = sw_command(|sw| {
        sw.reset();
    });

    let on_cd_start = {
        let countdown = countdown.clone();
        let committed = committed.clone();
        let prefs = prefs.clone();
        let force_update = force_update.clone();
        let set_fields = set_fields.clone();
        Callback::from(move |_: MouseEvent| {
            start_countdown(&countdown, &committed, &prefs, &set_fields);
            force_update.force_update();
        })
    };
    let on_cd_pause = {
        let countdown = countdown.clone();
        let force_update = force_update.clone();
        Callback::from(move |_: MouseEvent| {
            countdown.borrow_mut().pause();
            force_update.force_update();
        })
    };
    let on_cd_reset = {
        let countdown = countdown.clone();
        let cd_finished = cd_finished.clone();
        let force_update = force_update.clone();
        Callback::from(move |_: MouseEvent| {
            countdown.borrow_mut().reset();
            cd_finished.set(false);
            force_update.force_update();
        })
    };
    let on_beep_toggle = {
        let countdown = countdown.clone();
        let beep_on = beep_on.clone();
        Callback::from(move |_: MouseEvent| {
            let enabled = !*beep_on;
            countdown
                .borrow_mut()
                .alert_mut()
                .browser
                .set_beep_enabled(enabled);
            beep_on.set(enabled);
        })
    };
    let on_preset = {
        let countdown = countdown.clone();
        let committed = committed.clone();
        let prefs = prefs.clone();
        let cd_finished = cd_finished.clone();
        let force_update = force_update.clone();
        Callback::from(move |minutes: u64| {
            let input = DurationInput::from_minutes(minutes);
            let texts = input.field_texts();
            for (set, text) in set_fields.iter().zip(texts.iter()) {
                set.emit(text.clone());
            }
            *committed.borrow_mut() = texts;
            prefs.borrow_mut().set_countdown_input(input);
            {
                let mut countdown = countdown.borrow_mut();
                countdown.reset();
                countdown.configure(input);
            }
            cd_finished.set(false);
            force_update.force_update();
        })
    };

    // --- View state ---
    let sw = stopwatch.borrow();
    let sw_running = sw.is_running();
    let sw_start_label = if sw.state() == TimerState::Paused { "Resume" } else { "Start" };
    let cd = countdown.borrow();
    let cd_running = cd.is_running();
    let cd_start_label = if cd.state() == TimerState::Paused { "Resume" } else { "Start" };

    html! {
        <div class="card">
            <div id="live" class="sr-only" aria-live="polite"></div>
            <TabBar active={*mode} on_select={on_select_tab} />

            <div class="panels">
                <section id="panel-stopwatch" class="panel" role="tabpanel"
                    aria-labelledby="tab-stopwatch"
                    aria-hidden={(*mode != Mode::Stopwatch).to_string()}>
                    <StopwatchReadout text={(*sw_text).clone()} />
                    <div class="controls">
                        if sw_running {
                            <button id="sw-pause" class="button" aria-label="Pause stopwatch"
                                onclick={on_sw_pause}>{ "Pause" }</button>
                        } else {
                            <button id="sw-start" class="button primary span-2"
                                aria-label="Start stopwatch" onclick={on_sw_start}>
                                { sw_start_label }
                            </button>
                        }
                        <button id="sw-lap" class="button accent" aria-label="Add lap"
                            disabled={!sw.can_lap()} onclick={on_sw_lap}>{ "Lap" }</button>
                        <button id="sw-reset" class="button" aria-label="Reset stopwatch"
                            disabled={!sw.can_reset()} onclick={on_sw_reset}>{ "Reset" }</button>
                    </div>
                    <ShortcutHelp />
                    <LapList rows={(*sw_laps).clone()} total={(*sw_text).clone()} />
                </section>

                <section id="panel-countdown"
                    class={classes!("panel", (*cd_finished).then_some("finished"))}
                    role="tabpanel" aria-labelledby="tab-countdown"
                    aria-hidden={(*mode != Mode::Countdown).to_string()}>
                    <div class="input-row" aria-label="Countdown time input">
                        <TimeFieldInput ..TimeFieldInputProps::for_field("cd-h", "Hours", "HH", &hours) />
                        <span class="sep">{ ":" }</span>
                        <TimeFieldInput ..TimeFieldInputProps::for_field("cd-m", "Minutes", "MM", &minutes) />
                        <span class="sep">{ ":" }</span>
                        <TimeFieldInput ..TimeFieldInputProps::for_field("cd-s", "Seconds", "SS", &seconds) />
                    </div>
                    <QuickPresets on_pick={on_preset} />
                    <div id="cd-readout" class="readout" aria-live="off">{ (*cd_text).clone() }</div>
                    <div class="controls">
                        if cd_running {
                            <button id="cd-pause" class="button" aria-label="Pause countdown"
                                onclick={on_cd_pause}>{ "Pause" }</button>
                        } else {
                            <button id="cd-start" class="button primary span-2"
                                aria-label="Start countdown" onclick={on_cd_start}>
                                { cd_start_label }
                            </button>
                        }
                        <button id="cd-reset" class="button" aria-label="Reset countdown"
                            onclick={on_cd_reset}>{ "Reset" }</button>
                        <button id="cd-beep" class="button" aria-pressed={beep_on.to_string()}
                            aria-label="Toggle beep on finish" onclick={on_beep_toggle}>
                            { format!("Beep: {}", if *beep_on { "On" } else { "Off" }) }
                        </button>
                    </div>
                </section>
            </div>
        </div>
    }
}

/// Entry point: installs the panic hook and mounts the app into `#app`.
fn main() {
    console_error_panic_hook::set_once();
    match gloo_utils::document().get_element_by_id("app") {
        Some(root) => yew::Renderer::<App>::with_root(root).render(),
        None => yew::Renderer::<App>::new().render(),
    };
}

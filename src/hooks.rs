use timer_widget::input::{digits_only, sanitize_field, step_field, Field};
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// State and callbacks for one of the H/M/S countdown fields.
#[derive(Clone)]
pub struct TimeField {
    /// Current text in the input box.
    pub text: String,
    /// Keeps only digits while typing.
    pub oninput: Callback<InputEvent>,
    /// Canonicalizes the text (clamped, two digits) and commits it.
    pub onblur: Callback<FocusEvent>,
    /// ArrowUp/ArrowDown step the value by one and commit it.
    pub onkeydown: Callback<KeyboardEvent>,
    /// Replace the text programmatically. Does not commit.
    pub set_text: Callback<String>,
}

/// Custom hook managing a single time field. Every committed value is reported
/// through `on_commit` together with the field it belongs to.
#[hook]
pub fn use_time_field(
    initial_text: String,
    field: Field,
    on_commit: Callback<(Field, String)>,
) -> TimeField {
    let text = use_state(|| initial_text);

    let oninput = {
        let text = text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let digits = digits_only(&input.value());
            // Write back so rejected characters disappear from the box.
            input.set_value(&digits);
            text.set(digits);
        })
    };

    let onblur = {
        let text = text.clone();
        let on_commit = on_commit.clone();
        Callback::from(move |e: FocusEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let clean = sanitize_field(&input.value(), field.max());
            text.set(clean.clone());
            on_commit.emit((field, clean));
        })
    };

    let onkeydown = {
        let text = text.clone();
        Callback::from(move |e: KeyboardEvent| {
            let up = match e.key().as_str() {
                "ArrowUp" => true,
                "ArrowDown" => false,
                _ => return,
            };
            e.prevent_default();
            let input: HtmlInputElement = e.target_unchecked_into();
            let next = step_field(&input.value(), field.max(), up);
            text.set(next.clone());
            on_commit.emit((field, next));
        })
    };

    let set_text = {
        let text = text.clone();
        Callback::from(move |value: String| text.set(value))
    };

    TimeField {
        text: (*text).clone(),
        oninput,
        onblur,
        onkeydown,
        set_text,
    }
}

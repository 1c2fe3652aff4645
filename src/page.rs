//! HTML calculator page.
//!
//! A single self-contained document: inline CSS, no JavaScript. The form posts
//! back the field names [`crate::form`] reads, so a server only has to feed the
//! body pairs to [`crate::form::submit`] and render the [`Submission`].
//!
//! ## Layout
//!
//! ```text
//! Sunny 16 Calculator
//! (•) Full stops  ( ) 1/3 stops
//! Light      [EV 15: Sunny     v]
//! Aperture   [f/16             v]  [x] Lock
//! Shutter    [1/125            v]  [x] Lock
//! ISO        [100              v]  [ ] Lock
//! [Calculate]
//! ISO: 100          <- exactly one of result / warning / error, or none
//! ```

use crate::catalog::StopIncrement;
use crate::form::{self, FormOptions, SelectOption, Submission};
use crate::format;
use crate::types::{ExposureResult, Variable};
use maud::{DOCTYPE, Markup, html};

const CSS: &str = include_str!("../static/style.css");

const INCREMENTS: [(StopIncrement, &str); 2] = [
    (StopIncrement::Full, "Full stops"),
    (StopIncrement::Third, "1/3 stops"),
];

fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body {
                (content)
            }
        }
    }
}

fn stop_selector(selected: StopIncrement) -> Markup {
    html! {
        fieldset.stop-increment {
            @for (increment, label) in INCREMENTS {
                label {
                    input type="radio" name=(form::STOP_INCREMENT) value=(increment.as_str())
                        checked[increment == selected];
                    " " (label)
                }
            }
        }
    }
}

/// A labelled `<select>` with an optional lock checkbox.
fn field_row<T: PartialEq>(
    label: &str,
    name: &str,
    options: &[SelectOption<T>],
    selected: &T,
    value_of: impl Fn(&SelectOption<T>) -> String,
    lock: Option<(&str, bool)>,
) -> Markup {
    html! {
        div.field {
            label for=(name) { (label) }
            select id=(name) name=(name) {
                @for option in options {
                    option value=(value_of(option)) selected[option.value == *selected] {
                        (option.label)
                    }
                }
            }
            @if let Some((lock_name, locked)) = lock {
                label.lock {
                    input type="checkbox" name=(lock_name) checked[locked];
                    " Lock"
                }
            }
        }
    }
}

fn form_fields(submission: &Submission) -> Markup {
    let request = &submission.form.request;
    let FormOptions {
        iso,
        aperture,
        shutter_speed,
        ev,
    } = &submission.options;
    html! {
        (field_row("Light", form::EV, ev, &request.ev, |o| o.value.to_string(), None))
        (field_row(
            Variable::Aperture.label(),
            form::APERTURE,
            aperture,
            &request.aperture,
            |o| o.value.to_string(),
            Some((form::LOCK_APERTURE, request.locks.aperture)),
        ))
        (field_row(
            Variable::ShutterSpeed.label(),
            form::SHUTTER_SPEED,
            shutter_speed,
            &request.shutter_speed,
            |o| format::shutter_speed_label(o.value),
            Some((form::LOCK_SHUTTER_SPEED, request.locks.shutter_speed)),
        ))
        (field_row(
            Variable::Iso.label(),
            form::ISO,
            iso,
            &request.iso,
            |o| o.value.to_string(),
            Some((form::LOCK_ISO, request.locks.iso)),
        ))
    }
}

/// The result, warning and error regions. At most one renders.
fn messages(result: Option<&ExposureResult>) -> Markup {
    let record = result.map(ExposureResult::to_record).unwrap_or_default();
    html! {
        @if let Some(value) = &record.result {
            div.message.result { (record.result_key) ": " strong { (value) } }
        }
        @if !record.warning.is_empty() {
            div.message.warning role="status" { (record.warning) }
        }
        @if !record.error.is_empty() {
            div.message.error role="alert" { (record.error) }
        }
    }
}

/// Render the calculator.
///
/// `show_result` is false for a fresh page (a GET), where the form shows the
/// defaults and no message region is rendered.
pub fn render_calculator_page(submission: &Submission, show_result: bool) -> Markup {
    let content = html! {
        main {
            h1 { "Sunny 16 Calculator" }
            form method="post" {
                (stop_selector(submission.form.stop_increment))
                (form_fields(submission))
                button type="submit" { "Calculate" }
            }
            (messages(show_result.then_some(&submission.result)))
        }
    };
    base_document("Sunny 16 Calculator", CSS, content)
}

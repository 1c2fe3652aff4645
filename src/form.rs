//! Calculator form adapter.
//!
//! Turns submitted form fields into an [`ExposureRequest`] and back into the
//! option lists a form renders. Used by the CLI and by the HTML page.
//!
//! ## Fields
//!
//! | Field | Meaning | Missing |
//! |---|---|---|
//! | `aperture` | f-number (`16`, `5.6`) | catalog default |
//! | `shutterspeed` | seconds, `1/125` or `0.008` | catalog default |
//! | `iso` | integer ISO | catalog default |
//! | `ev` | integer EV | catalog default |
//! | `lock_aperture`, `lock_shutterspeed`, `lock_iso` | checkbox; present = locked | unlocked |
//! | `stop_increment` | `full` or anything else for third stops | configured default |
//!
//! With full stops selected, a value that is not a full stop (e.g. left over
//! from a third-stop session) is replaced by the default.

use crate::catalog::{Catalog, StopIncrement};
use crate::engine::{Engine, ExposureError};
use crate::format::{self, FormatError};
use crate::types::{ExposureRequest, ExposureResult, Locks, Variable};
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

pub const APERTURE: &str = "aperture";
pub const SHUTTER_SPEED: &str = "shutterspeed";
pub const ISO: &str = "iso";
pub const EV: &str = "ev";
pub const LOCK_APERTURE: &str = "lock_aperture";
pub const LOCK_SHUTTER_SPEED: &str = "lock_shutterspeed";
pub const LOCK_ISO: &str = "lock_iso";
pub const STOP_INCREMENT: &str = "stop_increment";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("{field} must be a number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error(transparent)]
    ShutterSpeed(#[from] FormatError),
}

/// Parsed form state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormData {
    pub request: ExposureRequest,
    pub stop_increment: StopIncrement,
}

impl FormData {
    /// Defaults, nothing locked.
    pub fn from_defaults(catalog: &Catalog, stop_increment: StopIncrement) -> Self {
        let defaults = catalog.defaults();
        Self {
            request: ExposureRequest {
                aperture: defaults.aperture,
                shutter_speed: defaults.shutter_speed,
                iso: defaults.iso,
                ev: defaults.ev,
                locks: Locks::default(),
            },
            stop_increment,
        }
    }

    /// Replace values that are not selectable at the chosen increment.
    ///
    /// Only full stops narrow the selection; third stops leave the form alone.
    pub fn apply_stop_selector(&mut self, catalog: &Catalog) {
        if self.stop_increment != StopIncrement::Full {
            return;
        }
        let defaults = catalog.defaults();
        let selectable = |variable: Variable, value: f64| {
            catalog
                .ui(variable)
                .with_increment(StopIncrement::Full)
                .contains(value)
        };

        let request = &mut self.request;
        if !selectable(Variable::Iso, f64::from(request.iso)) {
            warn!(iso = request.iso, "not a full stop, using default");
            request.iso = defaults.iso;
        }
        if !selectable(Variable::Aperture, request.aperture) {
            warn!(aperture = request.aperture, "not a full stop, using default");
            request.aperture = defaults.aperture;
        }
        if !selectable(Variable::ShutterSpeed, request.shutter_speed) {
            warn!(
                shutter_speed = request.shutter_speed,
                "not a full stop, using default"
            );
            request.shutter_speed = defaults.shutter_speed;
        }
    }
}

fn parse_number<T: FromStr>(field: &'static str, raw: &str) -> Result<T, FormError> {
    raw.trim().parse().map_err(|_| FormError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Extract form data, filling missing fields from the catalog defaults.
pub fn extract_form_data<'a, I>(
    fields: I,
    catalog: &Catalog,
    default_increment: StopIncrement,
) -> Result<FormData, FormError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let fields: BTreeMap<&str, &str> = fields.into_iter().collect();
    let mut form = FormData::from_defaults(catalog, default_increment);

    if let Some(choice) = fields.get(STOP_INCREMENT) {
        form.stop_increment = StopIncrement::from_choice(choice);
    }

    let request = &mut form.request;
    if let Some(raw) = fields.get(APERTURE) {
        request.aperture = parse_number(APERTURE, raw)?;
    }
    if let Some(raw) = fields.get(SHUTTER_SPEED) {
        request.shutter_speed = format::parse_shutter_speed(raw)?;
    }
    if let Some(raw) = fields.get(ISO) {
        request.iso = parse_number(ISO, raw)?;
    }
    if let Some(raw) = fields.get(EV) {
        request.ev = parse_number(EV, raw)?;
    }
    request.locks = Locks {
        aperture: fields.contains_key(LOCK_APERTURE),
        shutter_speed: fields.contains_key(LOCK_SHUTTER_SPEED),
        iso: fields.contains_key(LOCK_ISO),
    };
    Ok(form)
}

/// One `<option>` of a select.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption<T> {
    pub value: T,
    pub label: String,
}

/// Option lists for every select on the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormOptions {
    pub iso: Vec<SelectOption<u32>>,
    pub aperture: Vec<SelectOption<f64>>,
    pub shutter_speed: Vec<SelectOption<f64>>,
    pub ev: Vec<SelectOption<i32>>,
}

fn scale_options(
    catalog: &Catalog,
    variable: Variable,
    increment: StopIncrement,
) -> Vec<SelectOption<f64>> {
    catalog
        .ui_options(variable, increment)
        .into_iter()
        .map(|(value, label)| SelectOption { value, label })
        .collect()
}

/// Light conditions, brightest first: `EV 16: Snow/Sand`, `EV 15: Sunny`, …
pub fn ev_options(catalog: &Catalog) -> Vec<SelectOption<i32>> {
    catalog
        .light_conditions()
        .iter()
        .rev()
        .map(|(&ev, description)| SelectOption {
            value: ev,
            label: format!("EV {ev}: {description}"),
        })
        .collect()
}

pub fn form_options(catalog: &Catalog, increment: StopIncrement) -> FormOptions {
    let iso = scale_options(catalog, Variable::Iso, increment)
        .into_iter()
        .map(|option| SelectOption {
            value: option.value.round() as u32,
            label: option.label,
        })
        .collect();
    FormOptions {
        iso,
        aperture: scale_options(catalog, Variable::Aperture, increment),
        shutter_speed: scale_options(catalog, Variable::ShutterSpeed, increment),
        ev: ev_options(catalog),
    }
}

/// A processed form submission, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub form: FormData,
    pub options: FormOptions,
    pub result: ExposureResult,
}

/// Extract, normalize, validate and calculate in one go.
///
/// Unparseable fields become an `Invalid input` error result on a form reset
/// to defaults. Only engine faults are returned as `Err`.
pub fn submit<'a, I>(
    engine: &Engine<'_>,
    fields: I,
    default_increment: StopIncrement,
) -> Result<Submission, ExposureError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let catalog = engine.catalog();
    let (form, result) = match extract_form_data(fields, catalog, default_increment) {
        Ok(mut form) => {
            form.apply_stop_selector(catalog);
            let result = engine.process_calculation(&form.request)?;
            (form, result)
        }
        Err(err) => {
            warn!(%err, "rejected form input");
            (
                FormData::from_defaults(catalog, default_increment),
                ExposureResult::Error(format!("Invalid input: {err}")),
            )
        }
    };
    Ok(Submission {
        options: form_options(catalog, form.stop_increment),
        form,
        result,
    })
}

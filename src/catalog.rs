//! Stop scale catalog: the photographic values the calculator works with.
//!
//! Every quantity (ISO, aperture, shutter speed) has two scales:
//!
//! - a **standard** scale, used to snap computed values to the nearest stop.
//!   It extends three third-stops past the selectable range on each end so that
//!   borderline results still have a neighbour to snap to.
//! - a **UI** scale, the standard scale trimmed by [`UI_TRIM`] entries on each
//!   end. Values outside it are reported as out of range.
//!
//! ```text
//! ISO            50 64 80 | 100 … 25600 | 32000 40000 51200
//! Aperture      1.0 1.1 1.2 | 1.4 … 22  | 25 29 32
//! Shutter (s)   1/16000 … | 1/8000 … 1  | 1.3 1.6 2
//! ```
//!
//! Scales are stored ascending and are third-stop spaced. Full stops are every
//! [`FULL_STOP_INTERVAL`]th entry, starting from the first.
//!
//! The [`Catalog`] is built once at startup and handed around by reference.
//! Nothing in it is mutated after construction.

use crate::format;
use crate::types::Variable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Every third entry of a third-stop scale is a full stop.
pub const FULL_STOP_INTERVAL: usize = 3;

/// Entries trimmed from each end of a standard scale to form its UI scale.
pub const UI_TRIM: usize = 3;

const STANDARD_ISO: [f64; 31] = [
    50.0, 64.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0, 320.0, 400.0, 500.0, 640.0, 800.0, 1000.0,
    1250.0, 1600.0, 2000.0, 2500.0, 3200.0, 4000.0, 5000.0, 6400.0, 8000.0, 10000.0, 12800.0,
    16000.0, 20000.0, 25600.0, 32000.0, 40000.0, 51200.0,
];

const STANDARD_APERTURES: [f64; 31] = [
    1.0, 1.1, 1.2, 1.4, 1.6, 1.8, 2.0, 2.2, 2.5, 2.8, 3.2, 3.5, 4.0, 4.5, 5.0, 5.6, 6.3, 7.1, 8.0,
    9.0, 10.0, 11.0, 13.0, 14.0, 16.0, 18.0, 20.0, 22.0, 25.0, 29.0, 32.0,
];

// Written as reciprocals so that a parsed "1/125" label yields the same bits.
const STANDARD_SHUTTER_SPEEDS: [f64; 46] = [
    1.0 / 16000.0,
    1.0 / 12800.0,
    1.0 / 10000.0,
    1.0 / 8000.0,
    1.0 / 6400.0,
    1.0 / 5000.0,
    1.0 / 4000.0,
    1.0 / 3200.0,
    1.0 / 2500.0,
    1.0 / 2000.0,
    1.0 / 1600.0,
    1.0 / 1250.0,
    1.0 / 1000.0,
    1.0 / 800.0,
    1.0 / 640.0,
    1.0 / 500.0,
    1.0 / 400.0,
    1.0 / 320.0,
    1.0 / 250.0,
    1.0 / 200.0,
    1.0 / 160.0,
    1.0 / 125.0,
    1.0 / 100.0,
    1.0 / 80.0,
    1.0 / 60.0,
    1.0 / 50.0,
    1.0 / 40.0,
    1.0 / 30.0,
    1.0 / 25.0,
    1.0 / 20.0,
    1.0 / 15.0,
    1.0 / 13.0,
    1.0 / 10.0,
    1.0 / 8.0,
    1.0 / 6.0,
    1.0 / 5.0,
    1.0 / 4.0,
    1.0 / 3.0,
    1.0 / 2.5,
    1.0 / 2.0,
    1.0 / 1.6,
    1.0 / 1.3,
    1.0,
    1.3,
    1.6,
    2.0,
];

const LIGHT_CONDITIONS: [(i32, &str); 6] = [
    (16, "Snow/Sand"),
    (15, "Sunny"),
    (14, "Slight Overcast"),
    (13, "Overcast"),
    (12, "Heavy Overcast"),
    (11, "Open Shade/Sunset"),
];

#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("stop scale must not be empty")]
    Empty,
    #[error("stop scale value {0} is not a positive finite number")]
    NonPositive(f64),
    #[error("stop scale is not strictly ascending at {previous} -> {next}")]
    NotAscending { previous: f64, next: f64 },
    #[error("cannot trim {trim} entries from each end of a {len}-entry scale")]
    TrimTooLarge { trim: usize, len: usize },
}

/// Stop spacing used for selectable values and for snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopIncrement {
    #[default]
    Full,
    Third,
}

impl StopIncrement {
    /// Lenient parse used for form input: anything other than `"full"`
    /// selects third stops.
    pub fn from_choice(choice: &str) -> Self {
        if choice == "full" {
            StopIncrement::Full
        } else {
            StopIncrement::Third
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StopIncrement::Full => "full",
            StopIncrement::Third => "third",
        }
    }
}

impl fmt::Display for StopIncrement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("unknown stop increment '{0}' (expected \"full\" or \"third\")")]
pub struct UnknownIncrement(String);

impl FromStr for StopIncrement {
    type Err = UnknownIncrement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(StopIncrement::Full),
            "third" => Ok(StopIncrement::Third),
            other => Err(UnknownIncrement(other.to_string())),
        }
    }
}

/// An ascending, duplicate-free sequence of positive stop values.
#[derive(Debug, Clone, PartialEq)]
pub struct StopScale {
    values: Vec<f64>,
}

impl StopScale {
    pub fn new(values: Vec<f64>) -> Result<Self, CatalogError> {
        let first = *values.first().ok_or(CatalogError::Empty)?;
        if !first.is_finite() || first <= 0.0 {
            return Err(CatalogError::NonPositive(first));
        }
        for pair in values.windows(2) {
            let (previous, next) = (pair[0], pair[1]);
            if !next.is_finite() || next <= 0.0 {
                return Err(CatalogError::NonPositive(next));
            }
            if next <= previous {
                return Err(CatalogError::NotAscending { previous, next });
            }
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// At least 1; an empty scale cannot be constructed.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false. Kept alongside [`StopScale::len`].
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.values[0]
    }

    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Exact membership test. Only meaningful for values taken from a scale.
    pub fn contains(&self, value: f64) -> bool {
        self.position(value).is_some()
    }

    pub fn position(&self, value: f64) -> Option<usize> {
        self.values.iter().position(|&v| v == value)
    }

    /// Every `n`th entry, starting with the first.
    pub fn every_nth(&self, n: usize) -> StopScale {
        let step = n.max(1);
        StopScale {
            values: self.values.iter().step_by(step).copied().collect(),
        }
    }

    /// Drop `n` entries from each end.
    pub fn trimmed(&self, n: usize) -> Result<StopScale, CatalogError> {
        if n * 2 >= self.values.len() {
            return Err(CatalogError::TrimTooLarge {
                trim: n,
                len: self.values.len(),
            });
        }
        Ok(StopScale {
            values: self.values[n..self.values.len() - n].to_vec(),
        })
    }

    pub fn with_increment(&self, increment: StopIncrement) -> StopScale {
        match increment {
            StopIncrement::Full => self.every_nth(FULL_STOP_INTERVAL),
            StopIncrement::Third => self.clone(),
        }
    }
}

/// Default input values used when a form field is missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Defaults {
    pub aperture: f64,
    pub shutter_speed: f64,
    pub iso: u32,
    pub ev: i32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            aperture: 16.0,
            shutter_speed: 1.0 / 125.0,
            iso: 100,
            ev: 15,
        }
    }
}

#[derive(Debug, Clone)]
struct Scales {
    standard: StopScale,
    standard_full: StopScale,
    ui: StopScale,
}

impl Scales {
    fn from_standard(values: &[f64]) -> Result<Self, CatalogError> {
        let standard = StopScale::new(values.to_vec())?;
        Ok(Self {
            standard_full: standard.every_nth(FULL_STOP_INTERVAL),
            ui: standard.trimmed(UI_TRIM)?,
            standard,
        })
    }
}

/// Read-only photographic reference data.
#[derive(Debug, Clone)]
pub struct Catalog {
    iso: Scales,
    aperture: Scales,
    shutter_speed: Scales,
    /// Labels for the standard shutter scale, index-aligned with its values.
    shutter_labels: Vec<String>,
    light_conditions: BTreeMap<i32, &'static str>,
    defaults: Defaults,
}

impl Catalog {
    /// Build the Sunny 16 catalog from the built-in third-stop tables.
    pub fn sunny16() -> Result<Self, CatalogError> {
        let shutter_speed = Scales::from_standard(&STANDARD_SHUTTER_SPEEDS)?;
        let shutter_labels = shutter_speed
            .standard
            .values()
            .iter()
            .map(|&s| format::shutter_speed_label(s))
            .collect();
        Ok(Self {
            iso: Scales::from_standard(&STANDARD_ISO)?,
            aperture: Scales::from_standard(&STANDARD_APERTURES)?,
            shutter_speed,
            shutter_labels,
            light_conditions: LIGHT_CONDITIONS.into_iter().collect(),
            defaults: Defaults::default(),
        })
    }

    /// Replace the default input values (e.g. from `sunny16.toml`).
    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    fn scales(&self, variable: Variable) -> &Scales {
        match variable {
            Variable::Aperture => &self.aperture,
            Variable::ShutterSpeed => &self.shutter_speed,
            Variable::Iso => &self.iso,
        }
    }

    /// The full third-stop scale used for snapping.
    pub fn standard(&self, variable: Variable) -> &StopScale {
        &self.scales(variable).standard
    }

    /// The scale computed values are snapped to for a given increment.
    pub fn snap_scale(&self, variable: Variable, increment: StopIncrement) -> &StopScale {
        let scales = self.scales(variable);
        match increment {
            StopIncrement::Full => &scales.standard_full,
            StopIncrement::Third => &scales.standard,
        }
    }

    /// The selectable (in-range) third-stop scale.
    pub fn ui(&self, variable: Variable) -> &StopScale {
        &self.scales(variable).ui
    }

    /// Selectable values for an increment, paired with display labels.
    pub fn ui_options(&self, variable: Variable, increment: StopIncrement) -> Vec<(f64, String)> {
        self.ui(variable)
            .with_increment(increment)
            .values()
            .iter()
            .map(|&v| (v, format::value_label(variable, v)))
            .collect()
    }

    /// Precomputed label of a standard-scale shutter speed, by exact value.
    pub fn shutter_label(&self, seconds: f64) -> Option<&str> {
        self.shutter_speed
            .standard
            .position(seconds)
            .map(|i| self.shutter_labels[i].as_str())
    }

    pub fn shutter_labels(&self) -> &[String] {
        &self.shutter_labels
    }

    pub fn light_conditions(&self) -> &BTreeMap<i32, &'static str> {
        &self.light_conditions
    }

    pub fn light_condition(&self, ev: i32) -> Option<&'static str> {
        self.light_conditions.get(&ev).copied()
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::sunny16().expect("built-in stop tables must be valid")
    }
}

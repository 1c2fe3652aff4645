//! Sunny 16 exposure equations.
//!
//! With EV as the light level at ISO 100, the three variables are related by
//!
//! ```text
//! aperture²      = (iso / 100) · 2^ev · shutter
//! shutter        = aperture² / (2^ev · iso / 100)
//! iso            = 100 · (aperture² / shutter) / 2^ev
//! ```
//!
//! Each `compute_*` evaluates one equation exactly, snaps the result to the
//! nearest stop, and checks it against the selectable (UI) range. A value
//! outside the range is not an error: the request was well formed, the camera
//! just cannot do it. It comes back as [`Computed::OutOfRange`] with guidance.
//!
//! # Range policy
//!
//! [`RangeCheck::Exact`] (the default) compares the unrounded value with the
//! range ends; [`RangeCheck::Snapped`] compares the snapped value. Under
//! `Exact`, an aperture of f/22.5 is flagged even though it would snap to f/22.
//! One policy applies to all three equations.

use crate::catalog::{Catalog, StopIncrement};
use crate::format::{self, FormatError};
use crate::resolve::{ResolveError, resolve_nearest};
use crate::types::{ExposureRequest, ExposureResult, LockError, ResultValue, Variable};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExposureError {
    #[error("{name} must be a positive number, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("computed {0} is not a finite positive number")]
    NotFinite(Variable),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl ExposureError {
    /// Whether this is a broken invariant rather than bad input.
    pub fn is_fault(&self) -> bool {
        matches!(self, ExposureError::Format(_))
    }
}

/// Which value is compared against the selectable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeCheck {
    #[default]
    Exact,
    Snapped,
}

/// Which end of the range was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Below,
    Above,
}

/// A result outside the selectable range.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeWarning {
    pub variable: Variable,
    pub bound: Bound,
    /// The unrounded computed value.
    pub exact: f64,
    pub message: String,
}

/// Outcome of one exposure equation.
#[derive(Debug, Clone, PartialEq)]
pub enum Computed<T> {
    InRange(T),
    OutOfRange(RangeWarning),
}

impl<T> Computed<T> {
    pub fn in_range(self) -> Option<T> {
        match self {
            Computed::InRange(value) => Some(value),
            Computed::OutOfRange(_) => None,
        }
    }

    pub fn warning(&self) -> Option<&RangeWarning> {
        match self {
            Computed::InRange(_) => None,
            Computed::OutOfRange(warning) => Some(warning),
        }
    }
}

enum Snap {
    Within(f64),
    Outside(Bound),
}

fn positive(name: &'static str, value: f64) -> Result<f64, ExposureError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ExposureError::NonPositive { name, value })
    }
}

/// Lock-state check run before any calculation.
pub fn validate_locks(request: &ExposureRequest) -> Result<(), LockError> {
    request.locks.validate().map(|_| ())
}

/// Solves Sunny 16 exposures against a [`Catalog`].
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    catalog: &'a Catalog,
    range_check: RangeCheck,
    snap: StopIncrement,
}

impl<'a> Engine<'a> {
    /// Exact range checks, snapping to third stops.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            range_check: RangeCheck::Exact,
            snap: StopIncrement::Third,
        }
    }

    pub fn with_range_check(mut self, range_check: RangeCheck) -> Self {
        self.range_check = range_check;
        self
    }

    pub fn with_snap(mut self, snap: StopIncrement) -> Self {
        self.snap = snap;
        self
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    fn snap_and_check(&self, variable: Variable, exact: f64) -> Result<Snap, ExposureError> {
        if !exact.is_finite() || exact <= 0.0 {
            return Err(ExposureError::NotFinite(variable));
        }
        let snapped = resolve_nearest(self.catalog.snap_scale(variable, self.snap), exact)?;
        let probe = match self.range_check {
            RangeCheck::Exact => exact,
            RangeCheck::Snapped => snapped,
        };
        let ui = self.catalog.ui(variable);
        debug!(
            ?variable,
            exact,
            snapped,
            min = ui.min(),
            max = ui.max(),
            "resolved"
        );

        Ok(if probe < ui.min() {
            Snap::Outside(Bound::Below)
        } else if probe > ui.max() {
            Snap::Outside(Bound::Above)
        } else {
            Snap::Within(snapped)
        })
    }

    /// Solve for the f-number.
    pub fn compute_aperture(
        &self,
        iso: f64,
        ev: i32,
        shutter_speed: f64,
    ) -> Result<Computed<f64>, ExposureError> {
        let iso = positive("ISO", iso)?;
        let shutter_speed = positive("shutter speed", shutter_speed)?;
        let exact = ((iso / 100.0) * 2f64.powi(ev) * shutter_speed).sqrt();

        Ok(match self.snap_and_check(Variable::Aperture, exact)? {
            Snap::Within(aperture) => Computed::InRange(aperture),
            Snap::Outside(bound) => {
                let message = match bound {
                    Bound::Below => format!(
                        "Calculated aperture f/{exact:.1} is wider than available. \
                         Try decreasing ISO or using a faster shutter speed."
                    ),
                    Bound::Above => format!(
                        "Calculated aperture f/{exact:.1} is narrower than available. \
                         Try increasing ISO or using a slower shutter speed."
                    ),
                };
                Computed::OutOfRange(RangeWarning {
                    variable: Variable::Aperture,
                    bound,
                    exact,
                    message,
                })
            }
        })
    }

    /// Solve for the shutter speed in seconds.
    pub fn compute_shutter_speed(
        &self,
        aperture: f64,
        iso: f64,
        ev: i32,
    ) -> Result<Computed<f64>, ExposureError> {
        let aperture = positive("aperture", aperture)?;
        let iso = positive("ISO", iso)?;
        let exact = aperture.powi(2) / (2f64.powi(ev) * (iso / 100.0));

        Ok(match self.snap_and_check(Variable::ShutterSpeed, exact)? {
            Snap::Within(seconds) => Computed::InRange(seconds),
            Snap::Outside(bound) => {
                let shown = format::format_significant_digits(exact, 2)?;
                let message = match bound {
                    Bound::Below => format!(
                        "Calculated shutter speed ({shown}s) is faster than available. \
                         Try decreasing ISO or using a narrower aperture."
                    ),
                    Bound::Above => format!(
                        "Calculated shutter speed ({shown}s) is slower than available. \
                         Try increasing ISO or using a wider aperture."
                    ),
                };
                Computed::OutOfRange(RangeWarning {
                    variable: Variable::ShutterSpeed,
                    bound,
                    exact,
                    message,
                })
            }
        })
    }

    /// Solve for the ISO speed.
    pub fn compute_iso(
        &self,
        aperture: f64,
        shutter_speed: f64,
        ev: i32,
    ) -> Result<Computed<u32>, ExposureError> {
        let aperture = positive("aperture", aperture)?;
        let shutter_speed = positive("shutter speed", shutter_speed)?;
        let exact = 100.0 * (aperture.powi(2) / shutter_speed) / 2f64.powi(ev);

        Ok(match self.snap_and_check(Variable::Iso, exact)? {
            Snap::Within(iso) => Computed::InRange(iso.round() as u32),
            Snap::Outside(bound) => {
                let message = match bound {
                    Bound::Below => format!(
                        "Calculated ISO {exact:.0} is lower than available. \
                         Try using a narrower aperture or a faster shutter speed."
                    ),
                    Bound::Above => format!(
                        "Calculated ISO {exact:.0} is higher than available. \
                         Try using a wider aperture or a slower shutter speed."
                    ),
                };
                Computed::OutOfRange(RangeWarning {
                    variable: Variable::Iso,
                    bound,
                    exact,
                    message,
                })
            }
        })
    }

    fn solve(
        &self,
        variable: Variable,
        request: &ExposureRequest,
    ) -> Result<ExposureResult, ExposureError> {
        let iso = f64::from(request.iso);
        Ok(match variable {
            Variable::Aperture => {
                match self.compute_aperture(iso, request.ev, request.shutter_speed)? {
                    Computed::InRange(f) => ExposureResult::Solved(ResultValue::Aperture(f)),
                    Computed::OutOfRange(w) => ExposureResult::Warning(w.message),
                }
            }
            Variable::ShutterSpeed => {
                match self.compute_shutter_speed(request.aperture, iso, request.ev)? {
                    Computed::InRange(seconds) => {
                        let label = format::to_fraction(self.catalog, seconds)?.to_string();
                        ExposureResult::Solved(ResultValue::ShutterSpeed { seconds, label })
                    }
                    Computed::OutOfRange(w) => ExposureResult::Warning(w.message),
                }
            }
            Variable::Iso => {
                match self.compute_iso(request.aperture, request.shutter_speed, request.ev)? {
                    Computed::InRange(iso) => ExposureResult::Solved(ResultValue::Iso(iso)),
                    Computed::OutOfRange(w) => ExposureResult::Warning(w.message),
                }
            }
        })
    }

    /// Solve for the first unlocked variable.
    ///
    /// Expects the locks to have been validated. Bad numeric input comes back
    /// as [`ExposureResult::Error`]; only faults are returned as `Err`.
    pub fn perform_calculation(
        &self,
        request: &ExposureRequest,
    ) -> Result<ExposureResult, ExposureError> {
        let Some(variable) = request.locks.first_unlocked() else {
            return Ok(ExposureResult::Error(
                LockError {
                    locked: request.locks.count(),
                }
                .to_string(),
            ));
        };
        debug!(?variable, "solving");

        match self.solve(variable, request) {
            Ok(result) => Ok(result),
            Err(err) if err.is_fault() => Err(err),
            Err(err) => Ok(ExposureResult::Error(format!("Invalid input: {err}"))),
        }
    }

    /// Validate the locks, then calculate.
    pub fn process_calculation(
        &self,
        request: &ExposureRequest,
    ) -> Result<ExposureResult, ExposureError> {
        if let Err(err) = validate_locks(request) {
            debug!(locked = err.locked, "lock validation failed");
            return Ok(ExposureResult::Error(err.to_string()));
        }
        self.perform_calculation(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::types::Locks;

    // =========================================================================
    // compute_aperture
    // =========================================================================

    #[test]
    fn aperture_sunny_16_baseline() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let result = engine.compute_aperture(100.0, 15, 1.0 / 125.0).unwrap();
        assert_eq!(result, Computed::InRange(16.0));
    }

    #[test]
    fn aperture_too_wide() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let result = engine.compute_aperture(100.0, 11, 1.0 / 8000.0).unwrap();
        let warning = result.warning().expect("expected a warning");
        assert_eq!(warning.bound, Bound::Below);
        assert_eq!(
            warning.message,
            "Calculated aperture f/0.5 is wider than available. \
             Try decreasing ISO or using a faster shutter speed."
        );
    }

    #[test]
    fn aperture_too_narrow() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let result = engine.compute_aperture(6400.0, 16, 1.0).unwrap();
        let warning = result.warning().expect("expected a warning");
        assert_eq!(warning.bound, Bound::Above);
        assert!(warning.message.contains("narrower than available"));
        assert!(warning.message.contains("f/2048.0"));
    }

    #[test]
    fn aperture_rejects_non_positive_inputs() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        assert!(matches!(
            engine.compute_aperture(0.0, 15, 1.0 / 125.0),
            Err(ExposureError::NonPositive { name: "ISO", .. })
        ));
        assert!(matches!(
            engine.compute_aperture(100.0, 15, 0.0),
            Err(ExposureError::NonPositive {
                name: "shutter speed",
                ..
            })
        ));
    }

    // =========================================================================
    // compute_shutter_speed
    // =========================================================================

    #[test]
    fn shutter_sunny_16_baseline() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let seconds = engine
            .compute_shutter_speed(16.0, 100.0, 15)
            .unwrap()
            .in_range()
            .unwrap();
        assert_eq!(seconds, 1.0 / 125.0);
        assert_eq!(format::to_fraction(&catalog, seconds), Ok("1/125"));
    }

    #[test]
    fn shutter_f8_snaps_to_500() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let result = engine.compute_shutter_speed(8.0, 100.0, 15).unwrap();
        assert_eq!(result, Computed::InRange(1.0 / 500.0));
    }

    #[test]
    fn shutter_too_fast_shows_exact_speed() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let result = engine.compute_shutter_speed(1.4, 6400.0, 16).unwrap();
        let warning = result.warning().expect("expected a warning");
        assert_eq!(warning.bound, Bound::Below);
        assert_eq!(
            warning.message,
            "Calculated shutter speed (0.00000047s) is faster than available. \
             Try decreasing ISO or using a narrower aperture."
        );
    }

    #[test]
    fn shutter_too_slow() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let result = engine.compute_shutter_speed(64.0, 100.0, 11).unwrap();
        let warning = result.warning().expect("expected a warning");
        assert_eq!(warning.bound, Bound::Above);
        assert!(warning.message.contains("(2.0s) is slower than available"));
        assert!(warning.message.contains("wider aperture"));
    }

    #[test]
    fn shutter_warning_at_extreme_ev_keeps_two_digits() {
        // 1.96 / 2^1023 is about 2.18e-308
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let result = engine.compute_shutter_speed(1.4, 25600.0, 1015).unwrap();
        let warning = result.warning().expect("expected a warning");
        assert_eq!(warning.bound, Bound::Below);
        assert!(warning.message.starts_with("Calculated shutter speed (0.000"));
        assert!(warning.message.contains("00022s)"));
    }

    // =========================================================================
    // compute_iso
    // =========================================================================

    #[test]
    fn iso_open_shade() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let result = engine.compute_iso(16.0, 1.0 / 125.0, 11).unwrap();
        assert_eq!(result, Computed::InRange(1600));
    }

    #[test]
    fn iso_too_low() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let result = engine.compute_iso(1.4, 1.0, 16).unwrap();
        let warning = result.warning().expect("expected a warning");
        assert_eq!(warning.bound, Bound::Below);
        assert_eq!(
            warning.message,
            "Calculated ISO 0 is lower than available. \
             Try using a narrower aperture or a faster shutter speed."
        );
    }

    #[test]
    fn iso_too_high() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let result = engine.compute_iso(22.0, 1.0 / 8000.0, 11).unwrap();
        let warning = result.warning().expect("expected a warning");
        assert_eq!(warning.bound, Bound::Above);
        assert!(warning.message.contains("higher than available"));
    }

    // =========================================================================
    // Range boundaries
    // =========================================================================

    #[test]
    fn aperture_range_is_inclusive() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        // sqrt(iso/100 · 2^0 · t) with t = f²
        let widest = engine.compute_aperture(100.0, 0, 1.4 * 1.4).unwrap();
        assert_eq!(widest, Computed::InRange(1.4));
        let below = engine.compute_aperture(100.0, 0, 1.9).unwrap();
        assert_eq!(below.warning().map(|w| w.bound), Some(Bound::Below));

        let narrowest = engine.compute_aperture(100.0, 0, 484.0).unwrap();
        assert_eq!(narrowest, Computed::InRange(22.0));
        let above = engine.compute_aperture(100.0, 0, 485.0).unwrap();
        assert_eq!(above.warning().map(|w| w.bound), Some(Bound::Above));
    }

    #[test]
    fn shutter_range_is_inclusive() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let fastest = engine.compute_shutter_speed(1.0, 800_000.0, 0).unwrap();
        assert_eq!(fastest, Computed::InRange(1.0 / 8000.0));
        let below = engine.compute_shutter_speed(1.0, 800_100.0, 0).unwrap();
        assert_eq!(below.warning().map(|w| w.bound), Some(Bound::Below));

        let slowest = engine.compute_shutter_speed(16.0, 100.0, 8).unwrap();
        assert_eq!(slowest, Computed::InRange(1.0));
        let above = engine.compute_shutter_speed(16.0, 100.0, 7).unwrap();
        assert_eq!(above.warning().map(|w| w.bound), Some(Bound::Above));
    }

    #[test]
    fn iso_range_is_inclusive() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let lowest = engine.compute_iso(16.0, 1.0 / 128.0, 15).unwrap();
        assert_eq!(lowest, Computed::InRange(100));
        let below = engine.compute_iso(16.0, 1.0 / 127.0, 15).unwrap();
        assert_eq!(below.warning().map(|w| w.bound), Some(Bound::Below));

        let highest = engine.compute_iso(16.0, 1.0 / 128.0, 7).unwrap();
        assert_eq!(highest, Computed::InRange(25600));
        let above = engine.compute_iso(16.0, 1.0 / 129.0, 7).unwrap();
        assert_eq!(above.warning().map(|w| w.bound), Some(Bound::Above));
    }

    // =========================================================================
    // Range policy
    // =========================================================================

    #[test]
    fn exact_policy_flags_values_that_would_snap_into_range() {
        let catalog = catalog();
        let exact = Engine::new(&catalog);
        let snapped = Engine::new(&catalog).with_range_check(RangeCheck::Snapped);

        // sqrt(32768 / 64) = f/22.6, which snaps to f/22
        let shutter = 1.0 / 64.0;
        assert!(
            exact
                .compute_aperture(100.0, 15, shutter)
                .unwrap()
                .warning()
                .is_some()
        );
        assert_eq!(
            snapped.compute_aperture(100.0, 15, shutter).unwrap(),
            Computed::InRange(22.0)
        );
    }

    #[test]
    fn sunny_iso_at_125_depends_on_policy() {
        // 100 · 256 · 125 / 32768 = ISO 97.7
        let catalog = catalog();
        let exact = Engine::new(&catalog);
        let snapped = Engine::new(&catalog).with_range_check(RangeCheck::Snapped);

        let flagged = exact.compute_iso(16.0, 1.0 / 125.0, 15).unwrap();
        assert_eq!(flagged.warning().map(|w| w.bound), Some(Bound::Below));
        assert_eq!(
            snapped.compute_iso(16.0, 1.0 / 125.0, 15).unwrap(),
            Computed::InRange(100)
        );
    }

    #[test]
    fn full_stop_snapping() {
        let catalog = catalog();
        let engine = Engine::new(&catalog).with_snap(StopIncrement::Full);
        // exact f/18.1: f/18 in third stops, f/16 in full stops
        assert_eq!(
            engine.compute_aperture(100.0, 15, 1.0 / 100.0).unwrap(),
            Computed::InRange(16.0)
        );
        assert_eq!(
            Engine::new(&catalog)
                .compute_aperture(100.0, 15, 1.0 / 100.0)
                .unwrap(),
            Computed::InRange(18.0)
        );
    }

    // =========================================================================
    // perform_calculation / process_calculation
    // =========================================================================

    #[test]
    fn perform_solves_unlocked_aperture() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let result = engine
            .perform_calculation(&sunny_request(Variable::Aperture))
            .unwrap();
        assert_eq!(result, ExposureResult::Solved(ResultValue::Aperture(16.0)));
        assert_eq!(result.to_record().result_key, "Aperture");
    }

    #[test]
    fn perform_solves_unlocked_shutter_speed() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let result = engine
            .perform_calculation(&sunny_request(Variable::ShutterSpeed))
            .unwrap();
        let record = result.to_record();
        assert_eq!(record.result.as_deref(), Some("1/125"));
        assert_eq!(record.result_key, "Shutter Speed");
    }

    #[test]
    fn perform_solves_unlocked_iso() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let mut request = sunny_request(Variable::Iso);
        request.ev = 11;
        let result = engine.perform_calculation(&request).unwrap();
        assert_eq!(result, ExposureResult::Solved(ResultValue::Iso(1600)));
    }

    #[test]
    fn perform_reports_warning_not_error() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let request = request(16.0, 1.0, 25600, 11, Variable::Aperture);
        let result = engine.perform_calculation(&request).unwrap();
        let record = result.to_record();
        assert!(!record.warning.is_empty());
        assert_eq!(record.result, None);
        assert!(record.error.is_empty());
    }

    #[test]
    fn perform_converts_bad_input_to_error() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let request = request(16.0, 0.0, 100, 15, Variable::Aperture);
        let result = engine.perform_calculation(&request).unwrap();
        let message = result.error().expect("expected an error");
        assert!(message.starts_with("Invalid input: "));
        assert!(message.contains("shutter speed"));
    }

    #[test]
    fn perform_populates_exactly_one_region() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        let cases = [
            sunny_request(Variable::Aperture),
            sunny_request(Variable::ShutterSpeed),
            sunny_request(Variable::Iso),
            request(16.0, 1.0, 25600, 11, Variable::Aperture),
            request(-1.0, 1.0 / 125.0, 100, 15, Variable::ShutterSpeed),
        ];
        for request in cases {
            let record = engine.perform_calculation(&request).unwrap().to_record();
            assert_eq!(record.populated(), 1, "{request:?}");
        }
    }

    #[test]
    fn process_rejects_wrong_lock_count() {
        let catalog = catalog();
        let engine = Engine::new(&catalog);
        for locks in [
            Locks::default(),
            Locks {
                aperture: true,
                ..Locks::default()
            },
            Locks {
                aperture: true,
                shutter_speed: true,
                iso: true,
            },
        ] {
            let mut request = sunny_request(Variable::Aperture);
            request.locks = locks;
            let result = engine.process_calculation(&request).unwrap();
            assert_eq!(
                result.error(),
                Some("Please lock exactly two variables to calculate the third.")
            );
        }
    }

    #[test]
    fn validate_locks_matches_lock_count() {
        let mut request = sunny_request(Variable::Iso);
        assert!(validate_locks(&request).is_ok());
        request.locks.iso = true;
        assert_eq!(validate_locks(&request), Err(LockError { locked: 3 }));
    }

    #[test]
    fn format_errors_are_faults() {
        let err = ExposureError::Format(FormatError::NotOnScale(0.3));
        assert!(err.is_fault());
        assert!(!ExposureError::NotFinite(Variable::Iso).is_fault());
    }
}

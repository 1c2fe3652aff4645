//! Request and result records exchanged between the adapters and the engine.
//!
//! The request carries all three exposure variables plus their lock flags; the
//! engine solves for the one variable that is not locked. The result is an enum
//! so that "at most one of result, warning, error" holds by construction.
//! [`ResultRecord`] is the flat view adapters render and serialize.

use crate::format;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One of the three exposure variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Aperture,
    ShutterSpeed,
    Iso,
}

impl Variable {
    /// In solve-priority order.
    pub const ALL: [Variable; 3] = [Variable::Aperture, Variable::ShutterSpeed, Variable::Iso];

    /// Display label, also used as the result key.
    pub fn label(self) -> &'static str {
        match self {
            Variable::Aperture => "Aperture",
            Variable::ShutterSpeed => "Shutter Speed",
            Variable::Iso => "ISO",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Please lock exactly two variables to calculate the third.")]
pub struct LockError {
    /// How many variables were locked.
    pub locked: usize,
}

/// Which variables the user fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Locks {
    pub aperture: bool,
    pub shutter_speed: bool,
    pub iso: bool,
}

impl Locks {
    /// Lock every variable except `variable`.
    pub fn solving(variable: Variable) -> Self {
        Self {
            aperture: variable != Variable::Aperture,
            shutter_speed: variable != Variable::ShutterSpeed,
            iso: variable != Variable::Iso,
        }
    }

    pub fn is_locked(&self, variable: Variable) -> bool {
        match variable {
            Variable::Aperture => self.aperture,
            Variable::ShutterSpeed => self.shutter_speed,
            Variable::Iso => self.iso,
        }
    }

    pub fn count(&self) -> usize {
        [self.aperture, self.shutter_speed, self.iso]
            .into_iter()
            .filter(|&locked| locked)
            .count()
    }

    /// First unlocked variable in solve-priority order.
    pub fn first_unlocked(&self) -> Option<Variable> {
        Variable::ALL.into_iter().find(|&v| !self.is_locked(v))
    }

    /// The variable to solve for, provided exactly two are locked.
    pub fn validate(&self) -> Result<Variable, LockError> {
        match (self.count(), self.first_unlocked()) {
            (2, Some(variable)) => Ok(variable),
            (locked, _) => Err(LockError { locked }),
        }
    }
}

/// One calculation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureRequest {
    /// f-number.
    pub aperture: f64,
    /// Seconds.
    pub shutter_speed: f64,
    pub iso: u32,
    pub ev: i32,
    pub locks: Locks,
}

/// A solved value, already snapped to the stop scale.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultValue {
    Aperture(f64),
    ShutterSpeed { seconds: f64, label: String },
    Iso(u32),
}

impl ResultValue {
    pub fn variable(&self) -> Variable {
        match self {
            ResultValue::Aperture(_) => Variable::Aperture,
            ResultValue::ShutterSpeed { .. } => Variable::ShutterSpeed,
            ResultValue::Iso(_) => Variable::Iso,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            ResultValue::Aperture(f) => *f,
            ResultValue::ShutterSpeed { seconds, .. } => *seconds,
            ResultValue::Iso(iso) => f64::from(*iso),
        }
    }
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultValue::Aperture(value) => f.write_str(&format::aperture_label(*value)),
            ResultValue::ShutterSpeed { label, .. } => f.write_str(label),
            ResultValue::Iso(iso) => write!(f, "{iso}"),
        }
    }
}

/// Outcome of one calculation.
#[derive(Debug, Clone, PartialEq)]
pub enum ExposureResult {
    Solved(ResultValue),
    /// The request was well formed but the answer is outside the selectable range.
    Warning(String),
    Error(String),
}

impl ExposureResult {
    pub fn value(&self) -> Option<&ResultValue> {
        match self {
            ExposureResult::Solved(value) => Some(value),
            _ => None,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            ExposureResult::Warning(message) => Some(message),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ExposureResult::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Flatten into the record shape adapters render.
    pub fn to_record(&self) -> ResultRecord {
        let mut record = ResultRecord::default();
        match self {
            ExposureResult::Solved(value) => {
                record.result = Some(value.to_string());
                record.result_key = value.variable().label().to_string();
            }
            ExposureResult::Warning(message) => record.warning = message.clone(),
            ExposureResult::Error(message) => record.error = message.clone(),
        }
        record
    }
}

/// Flat result view: empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub result: Option<String>,
    pub result_key: String,
    pub warning: String,
    pub error: String,
}

impl ResultRecord {
    /// Number of populated message regions (result, warning, error).
    pub fn populated(&self) -> usize {
        usize::from(self.result.is_some())
            + usize::from(!self.warning.is_empty())
            + usize::from(!self.error.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locks(aperture: bool, shutter_speed: bool, iso: bool) -> Locks {
        Locks {
            aperture,
            shutter_speed,
            iso,
        }
    }

    #[test]
    fn validate_accepts_every_two_of_three() {
        assert_eq!(locks(true, true, false).validate(), Ok(Variable::Iso));
        assert_eq!(
            locks(true, false, true).validate(),
            Ok(Variable::ShutterSpeed)
        );
        assert_eq!(locks(false, true, true).validate(), Ok(Variable::Aperture));
    }

    #[test]
    fn validate_rejects_other_counts() {
        assert_eq!(
            locks(false, false, false).validate(),
            Err(LockError { locked: 0 })
        );
        assert_eq!(
            locks(true, false, false).validate(),
            Err(LockError { locked: 1 })
        );
        assert_eq!(
            locks(true, true, true).validate(),
            Err(LockError { locked: 3 })
        );
    }

    #[test]
    fn lock_error_message() {
        let err = LockError { locked: 1 };
        assert_eq!(
            err.to_string(),
            "Please lock exactly two variables to calculate the third."
        );
    }

    #[test]
    fn solving_locks_the_other_two() {
        for variable in Variable::ALL {
            let locks = Locks::solving(variable);
            assert_eq!(locks.count(), 2);
            assert_eq!(locks.validate(), Ok(variable));
        }
    }

    #[test]
    fn first_unlocked_follows_priority_order() {
        assert_eq!(
            locks(false, false, false).first_unlocked(),
            Some(Variable::Aperture)
        );
        assert_eq!(
            locks(true, false, false).first_unlocked(),
            Some(Variable::ShutterSpeed)
        );
        assert_eq!(locks(true, true, true).first_unlocked(), None);
    }

    #[test]
    fn result_value_display() {
        assert_eq!(ResultValue::Aperture(16.0).to_string(), "f/16");
        assert_eq!(ResultValue::Aperture(5.6).to_string(), "f/5.6");
        assert_eq!(ResultValue::Iso(1600).to_string(), "1600");
        let shutter = ResultValue::ShutterSpeed {
            seconds: 1.0 / 125.0,
            label: "1/125".to_string(),
        };
        assert_eq!(shutter.to_string(), "1/125");
    }

    #[test]
    fn record_for_solved_result() {
        let record = ExposureResult::Solved(ResultValue::Iso(400)).to_record();
        assert_eq!(record.result.as_deref(), Some("400"));
        assert_eq!(record.result_key, "ISO");
        assert!(record.warning.is_empty());
        assert!(record.error.is_empty());
        assert_eq!(record.populated(), 1);
    }

    #[test]
    fn record_for_warning_and_error() {
        let warning = ExposureResult::Warning("too dark".into()).to_record();
        assert_eq!(warning.result, None);
        assert_eq!(warning.result_key, "");
        assert_eq!(warning.warning, "too dark");
        assert_eq!(warning.populated(), 1);

        let error = ExposureResult::Error("bad".into()).to_record();
        assert_eq!(error.error, "bad");
        assert_eq!(error.populated(), 1);
    }

    #[test]
    fn record_serializes_to_json() {
        let record = ExposureResult::Solved(ResultValue::Aperture(8.0)).to_record();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["result"], "f/8");
        assert_eq!(json["result_key"], "Aperture");
        assert_eq!(json["warning"], "");
    }
}

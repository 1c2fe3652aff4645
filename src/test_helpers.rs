//! Shared test utilities for the sunny16 test suite.
//!
//! Request builders and form-field helpers so tests can state the exposure
//! they care about in one line.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let catalog = catalog();
//! let engine = Engine::new(&catalog);
//! let result = engine.perform_calculation(&sunny_request(Variable::Aperture));
//! ```

use crate::catalog::Catalog;
use crate::types::{ExposureRequest, Locks, Variable};

pub fn catalog() -> Catalog {
    Catalog::sunny16().unwrap()
}

/// A request solving for `solve`, with the other two variables locked.
pub fn request(
    aperture: f64,
    shutter_speed: f64,
    iso: u32,
    ev: i32,
    solve: Variable,
) -> ExposureRequest {
    ExposureRequest {
        aperture,
        shutter_speed,
        iso,
        ev,
        locks: Locks::solving(solve),
    }
}

/// f/16, 1/125, ISO 100 in full sun.
pub fn sunny_request(solve: Variable) -> ExposureRequest {
    request(16.0, 1.0 / 125.0, 100, 15, solve)
}

/// Iterate `(key, value)` pairs the way form extraction consumes them.
pub fn fields<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Iterator<Item = (&'a str, &'a str)> {
    pairs.iter().copied()
}

//! # Sunny 16
//!
//! An exposure calculator built on the Sunny 16 rule: in bright sun, at f/16,
//! the right shutter speed is the reciprocal of the ISO. Given the light level
//! as an EV and any two of aperture, shutter speed and ISO, it computes the
//! third, snapped to a value a camera actually offers.
//!
//! # Architecture
//!
//! ```text
//! form fields ─┐
//! CLI flags  ──┴→ ExposureRequest → Engine → ExposureResult → output / page
//!                                     │
//!                                  Catalog (stop scales, light conditions)
//! ```
//!
//! The engine is pure: no I/O, no global state. The catalog is built once and
//! shared read-only, so any number of requests can be served concurrently
//! against the same `&Catalog`.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Standard and selectable stop scales, light conditions, form defaults |
//! | [`resolve`] | Nearest-stop snapping, measured in stops (log2) |
//! | [`engine`] | The three exposure equations, range checks, lock validation |
//! | [`format`] | Aperture, shutter speed and ISO labels; significant-digit rendering |
//! | [`types`] | Request, lock and result records |
//! | [`form`] | Form field extraction, stop-increment handling, option lists |
//! | [`table`] | Sunny 16 ISO chart for a fixed aperture |
//! | [`page`] | Maud-rendered HTML calculator page |
//! | [`config`] | `sunny16.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Results Are Data
//!
//! A result outside the selectable range is a warning and a lock mistake is an
//! error message; both are values of [`types::ExposureResult`], rendered in
//! their own region of the page. Only broken invariants surface as `Err`.
//!
//! ## Distance In Stops
//!
//! Snapping compares `log2` of the values, so "nearest" means fewest stops
//! away. A linear comparison would favour the lower neighbour on every scale.
//!
//! ## Exact Range Checks
//!
//! By default the unrounded value is compared with the selectable range, so
//! f/22.6 is reported as out of range even though f/22 is the nearest stop.
//! `engine.range_check = "snapped"` in `sunny16.toml` compares the snapped
//! value instead. See [`engine::RangeCheck`].
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): malformed markup is
//! a build error, and all interpolation is auto-escaped.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod form;
pub mod format;
pub mod output;
pub mod page;
pub mod resolve;
pub mod table;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

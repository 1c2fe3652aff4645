//! Sunny 16 ISO chart.
//!
//! For a fixed aperture, the ISO needed under each light condition at a
//! handful of full-stop shutter speeds. Rows run from the brightest light
//! condition down; columns from the fastest shutter speed to the slowest.
//! Cells go through the same engine as a single calculation, so they snap
//! and range-check exactly like one.

use crate::engine::{Bound, Computed, Engine, ExposureError};
use crate::format;
use std::fmt;

/// Column shutter speeds, fastest first.
pub const CHART_SHUTTER_SPEEDS: [f64; 8] = [
    1.0 / 4000.0,
    1.0 / 2000.0,
    1.0 / 1000.0,
    1.0 / 500.0,
    1.0 / 250.0,
    1.0 / 125.0,
    1.0 / 60.0,
    1.0 / 30.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartCell {
    Iso(u32),
    OutOfRange(Bound),
}

impl fmt::Display for ChartCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartCell::Iso(iso) => write!(f, "{iso}"),
            ChartCell::OutOfRange(Bound::Below) => f.write_str("low"),
            ChartCell::OutOfRange(Bound::Above) => f.write_str("high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub ev: i32,
    pub condition: &'static str,
    pub cells: Vec<ChartCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IsoChart {
    pub aperture: f64,
    pub shutter_speeds: Vec<f64>,
    pub rows: Vec<ChartRow>,
}

impl IsoChart {
    pub fn shutter_labels(&self) -> Vec<String> {
        self.shutter_speeds
            .iter()
            .map(|&s| format::shutter_speed_label(s))
            .collect()
    }

    pub fn row(&self, ev: i32) -> Option<&ChartRow> {
        self.rows.iter().find(|row| row.ev == ev)
    }
}

/// Build the chart for `aperture` with the engine's snapping and range policy.
pub fn iso_chart(engine: &Engine<'_>, aperture: f64) -> Result<IsoChart, ExposureError> {
    let rows = engine
        .catalog()
        .light_conditions()
        .iter()
        .rev()
        .map(|(&ev, &condition)| {
            let cells = CHART_SHUTTER_SPEEDS
                .iter()
                .map(|&shutter_speed| {
                    Ok(match engine.compute_iso(aperture, shutter_speed, ev)? {
                        Computed::InRange(iso) => ChartCell::Iso(iso),
                        Computed::OutOfRange(warning) => ChartCell::OutOfRange(warning.bound),
                    })
                })
                .collect::<Result<Vec<_>, ExposureError>>()?;
            Ok(ChartRow {
                ev,
                condition,
                cells,
            })
        })
        .collect::<Result<Vec<_>, ExposureError>>()?;

    Ok(IsoChart {
        aperture,
        shutter_speeds: CHART_SHUTTER_SPEEDS.to_vec(),
        rows,
    })
}

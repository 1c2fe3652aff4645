//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## calc
//!
//! The answer leads; the inputs it was derived from follow as indented
//! context. A warning or error replaces the answer line.
//!
//! ```text
//! Aperture: f/16
//!     Shutter Speed: 1/125 (locked)
//!     ISO: 100 (locked)
//!     Light: EV 15, Sunny
//! ```
//!
//! ## options
//!
//! ```text
//! Full stops
//! Aperture
//!     f/1.4  f/2  f/2.8  f/4  f/5.6  f/8  f/11  f/16  f/22
//! ...
//! ```
//!
//! ## table
//!
//! ```text
//! ISO at f/16
//! EV  Light              1/4000  1/2000 ...
//! 16  Snow/Sand            1600     800 ...
//! ```

use crate::catalog::{Catalog, StopIncrement};
use crate::form::{FormOptions, SelectOption};
use crate::format;
use crate::table::IsoChart;
use crate::types::{ExposureRequest, ExposureResult, Variable};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn option_line<T>(options: &[SelectOption<T>]) -> String {
    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    format!("{}{}", indent(1), labels.join("  "))
}

// ============================================================================
// calc
// ============================================================================

fn input_line(variable: Variable, request: &ExposureRequest) -> String {
    let value = match variable {
        Variable::Aperture => format::aperture_label(request.aperture),
        Variable::ShutterSpeed => format::shutter_speed_label(request.shutter_speed),
        Variable::Iso => request.iso.to_string(),
    };
    let lock = if request.locks.is_locked(variable) {
        " (locked)"
    } else {
        ""
    };
    format!("{}{}: {}{}", indent(1), variable.label(), value, lock)
}

/// Format a calculation: the outcome, then the locked inputs and the light.
pub fn format_result(
    catalog: &Catalog,
    request: &ExposureRequest,
    result: &ExposureResult,
) -> Vec<String> {
    let mut lines = Vec::new();
    match result {
        ExposureResult::Solved(value) => {
            lines.push(format!("{}: {}", value.variable().label(), value));
        }
        ExposureResult::Warning(message) => lines.push(format!("Warning: {message}")),
        ExposureResult::Error(message) => {
            lines.push(format!("Error: {message}"));
            return lines;
        }
    }

    for variable in Variable::ALL {
        if request.locks.is_locked(variable) {
            lines.push(input_line(variable, request));
        }
    }
    let light = match catalog.light_condition(request.ev) {
        Some(condition) => format!("EV {}, {}", request.ev, condition),
        None => format!("EV {}", request.ev),
    };
    lines.push(format!("{}Light: {}", indent(1), light));
    lines
}

pub fn print_result(catalog: &Catalog, request: &ExposureRequest, result: &ExposureResult) {
    for line in format_result(catalog, request, result) {
        println!("{}", line);
    }
}

// ============================================================================
// options
// ============================================================================

/// Format the selectable values for one stop increment.
pub fn format_options(increment: StopIncrement, options: &FormOptions) -> Vec<String> {
    let heading = match increment {
        StopIncrement::Full => "Full stops",
        StopIncrement::Third => "1/3 stops",
    };
    let mut lines = vec![heading.to_string()];
    lines.push(Variable::Aperture.label().to_string());
    lines.push(option_line(&options.aperture));
    lines.push(Variable::ShutterSpeed.label().to_string());
    lines.push(option_line(&options.shutter_speed));
    lines.push(Variable::Iso.label().to_string());
    lines.push(option_line(&options.iso));
    lines.push("Light".to_string());
    for option in &options.ev {
        lines.push(format!("{}{}", indent(1), option.label));
    }
    lines
}

pub fn print_options(increment: StopIncrement, options: &FormOptions) {
    for line in format_options(increment, options) {
        println!("{}", line);
    }
}

// ============================================================================
// table
// ============================================================================

const CELL_WIDTH: usize = 8;

/// Format the ISO chart as aligned columns.
pub fn format_chart(chart: &IsoChart) -> Vec<String> {
    let light_width = chart
        .rows
        .iter()
        .map(|row| row.condition.len())
        .max()
        .unwrap_or(0)
        .max("Light".len());

    let mut lines = vec![format!(
        "ISO at {}",
        format::aperture_label(chart.aperture)
    )];

    let mut header = format!("{:<4}{:<light_width$}", "EV", "Light");
    for label in chart.shutter_labels() {
        header.push_str(&format!("{label:>CELL_WIDTH$}"));
    }
    lines.push(header.trim_end().to_string());

    for row in &chart.rows {
        let mut line = format!("{:<4}{:<light_width$}", row.ev, row.condition);
        for cell in &row.cells {
            line.push_str(&format!("{:>CELL_WIDTH$}", cell.to_string()));
        }
        lines.push(line);
    }
    lines
}

pub fn print_chart(chart: &IsoChart) {
    for line in format_chart(chart) {
        println!("{}", line);
    }
}

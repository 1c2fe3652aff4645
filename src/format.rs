//! Display formatting for exposure values.
//!
//! - Apertures render as `f/16`, `f/5.6`.
//! - Shutter speeds under a second render as reciprocals (`1/125`, `1/1.3`),
//!   a second or longer as plain seconds (`1`, `1.3`, `2`).
//! - ISO renders as a bare integer.
//!
//! [`to_fraction`] only accepts speeds that are on the standard scale. It is
//! called with snapped values, so a miss is a bug in the caller, reported as
//! [`FormatError::NotOnScale`].

use crate::catalog::Catalog;
use crate::types::Variable;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("shutter speed {0}s is not on the standard scale")]
    NotOnScale(f64),
    #[error("significant digits must be a positive integer, got {0}")]
    InvalidDigits(usize),
    #[error("'{0}' is not a shutter speed")]
    UnparseableShutterSpeed(String),
}

/// Round to two decimals and drop trailing zeros and a trailing point.
fn trim_decimal(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn aperture_label(f_number: f64) -> String {
    format!("f/{f_number}")
}

pub fn iso_label(iso: f64) -> String {
    format!("{iso}")
}

/// Label for any shutter speed in seconds.
pub fn shutter_speed_label(seconds: f64) -> String {
    if seconds >= 1.0 {
        trim_decimal(seconds)
    } else {
        format!("1/{}", trim_decimal(1.0 / seconds))
    }
}

/// Label for a value of the given variable.
pub fn value_label(variable: Variable, value: f64) -> String {
    match variable {
        Variable::Aperture => aperture_label(value),
        Variable::ShutterSpeed => shutter_speed_label(value),
        Variable::Iso => iso_label(value),
    }
}

/// Label of a standard-scale shutter speed.
pub fn to_fraction(catalog: &Catalog, seconds: f64) -> Result<&str, FormatError> {
    catalog
        .shutter_label(seconds)
        .ok_or(FormatError::NotOnScale(seconds))
}

/// Parse `"1/125"`, `"1"`, `"1.3"` or a decimal like `"0.008"` into seconds.
pub fn parse_shutter_speed(input: &str) -> Result<f64, FormatError> {
    let input = input.trim();
    let unparseable = || FormatError::UnparseableShutterSpeed(input.to_string());
    let seconds = match input.strip_prefix("1/") {
        Some(denominator) => {
            let denominator: f64 = denominator.trim().parse().map_err(|_| unparseable())?;
            if denominator <= 0.0 {
                return Err(unparseable());
            }
            1.0 / denominator
        }
        None => input.parse().map_err(|_| unparseable())?,
    };
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(unparseable());
    }
    Ok(seconds)
}

/// Fixed-point rendering of `value` rounded to `digits` significant digits.
///
/// `0.00042345` with 2 digits is `"0.00042"`; `123.4` with 2 digits is `"120"`.
pub fn format_significant_digits(value: f64, digits: usize) -> Result<String, FormatError> {
    if digits == 0 {
        return Err(FormatError::InvalidDigits(digits));
    }
    if value.is_nan() {
        return Ok("NaN".to_string());
    }
    if value.is_infinite() {
        return Ok(if value > 0.0 { "inf" } else { "-inf" }.to_string());
    }
    if value == 0.0 {
        return Ok("0".to_string());
    }

    // Round in scientific notation, then move the decimal point.
    let scientific = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .expect("scientific format has an exponent");
    let exponent: i32 = exponent.parse().expect("scientific exponent is an integer");
    let negative = mantissa.starts_with('-');
    let significant: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    let point = exponent + 1;
    let len = significant.len() as i32;
    let unsigned = if point <= 0 {
        format!("0.{}{significant}", "0".repeat(-point as usize))
    } else if point >= len {
        format!("{significant}{}", "0".repeat((point - len) as usize))
    } else {
        let (whole, fraction) = significant.split_at(point as usize);
        format!("{whole}.{fraction}")
    };
    Ok(if negative { format!("-{unsigned}") } else { unsigned })
}

//! Calculator configuration.
//!
//! Handles loading, validating, and merging `sunny16.toml`. Stock defaults are
//! overridden by whatever the user file sets; everything else keeps its stock
//! value.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [defaults]
//! aperture = 16.0           # Form value when a field is missing
//! shutter_speed = "1/125"   # "1/x" or seconds
//! iso = 100
//! ev = 15                   # Must be a known light condition (11-16)
//!
//! [form]
//! stop_increment = "full"   # Selector default: "full" or "third"
//!
//! [engine]
//! range_check = "exact"     # Compare the "exact" or the "snapped" value with the range
//! snap = "third"            # Snap results to "third" or "full" stops
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [engine]
//! range_check = "snapped"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::catalog::{Catalog, CatalogError, Defaults, StopIncrement};
use crate::engine::{Engine, RangeCheck};
use crate::format;
use crate::types::Variable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Calculator configuration loaded from `sunny16.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalculatorConfig {
    /// Values used when a form field is missing.
    pub defaults: DefaultsConfig,
    /// Form behaviour.
    pub form: FormConfig,
    /// Snapping and range-check policy.
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub aperture: f64,
    /// Shutter speed as written in the form, e.g. `"1/125"`.
    pub shutter_speed: String,
    pub iso: u32,
    pub ev: i32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            aperture: 16.0,
            shutter_speed: "1/125".to_string(),
            iso: 100,
            ev: 15,
        }
    }
}

impl DefaultsConfig {
    /// Check the values against `catalog` and convert them.
    pub fn resolve(&self, catalog: &Catalog) -> Result<Defaults, ConfigError> {
        let in_ui_range = |variable: Variable, value: f64| {
            let ui = catalog.ui(variable);
            value >= ui.min() && value <= ui.max()
        };

        if !self.aperture.is_finite() || !in_ui_range(Variable::Aperture, self.aperture) {
            return Err(ConfigError::Validation(format!(
                "defaults.aperture must be within the selectable range, got {}",
                self.aperture
            )));
        }

        let shutter_speed = format::parse_shutter_speed(&self.shutter_speed)
            .map_err(|e| ConfigError::Validation(format!("defaults.shutter_speed: {e}")))?;
        if catalog.shutter_label(shutter_speed).is_none()
            || !in_ui_range(Variable::ShutterSpeed, shutter_speed)
        {
            return Err(ConfigError::Validation(format!(
                "defaults.shutter_speed must be a selectable shutter speed, got '{}'",
                self.shutter_speed
            )));
        }

        if !in_ui_range(Variable::Iso, f64::from(self.iso)) {
            return Err(ConfigError::Validation(format!(
                "defaults.iso must be within the selectable range, got {}",
                self.iso
            )));
        }

        if catalog.light_condition(self.ev).is_none() {
            return Err(ConfigError::Validation(format!(
                "defaults.ev must be a known light condition, got {}",
                self.ev
            )));
        }

        Ok(Defaults {
            aperture: self.aperture,
            shutter_speed,
            iso: self.iso,
            ev: self.ev,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
    /// Which option lists the form shows before the user picks.
    pub stop_increment: StopIncrement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub range_check: RangeCheck,
    pub snap: StopIncrement,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            range_check: RangeCheck::Exact,
            snap: StopIncrement::Third,
        }
    }
}

impl CalculatorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.catalog().map(|_| ())
    }

    /// The Sunny 16 catalog with the configured defaults.
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        let catalog = Catalog::sunny16()?;
        let defaults = self.defaults.resolve(&catalog)?;
        Ok(catalog.with_defaults(defaults))
    }

    /// An engine over `catalog` with the configured policy.
    pub fn engine<'a>(&self, catalog: &'a Catalog) -> Engine<'a> {
        Engine::new(catalog)
            .with_range_check(self.engine.range_check)
            .with_snap(self.engine.snap)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CalculatorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using stock defaults");
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    info!(path = %path.display(), "loaded config");
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CalculatorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CalculatorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<CalculatorConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `sunny16.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Sunny 16 Calculator Configuration
# =================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Form defaults
# ---------------------------------------------------------------------------
[defaults]
# Used whenever a form field is missing. Each value must be selectable:
# aperture f/1.4-f/22, shutter speed 1/8000-1s, ISO 100-25600.
aperture = 16.0

# "1/x" for fractions of a second, or plain seconds.
shutter_speed = "1/125"

iso = 100

# Light level at ISO 100:
#   16 Snow/Sand, 15 Sunny, 14 Slight Overcast,
#   13 Overcast, 12 Heavy Overcast, 11 Open Shade/Sunset
ev = 15

# ---------------------------------------------------------------------------
# Form
# ---------------------------------------------------------------------------
[form]
# Option lists shown before the user picks: "full" or "third" stops.
# With "full", submitted values that are not full stops fall back to the
# defaults above.
stop_increment = "full"

# ---------------------------------------------------------------------------
# Engine
# ---------------------------------------------------------------------------
[engine]
# Which value is compared with the selectable range:
#   "exact"   the computed value before snapping (f/22.6 is out of range)
#   "snapped" the value after snapping (f/22.6 -> f/22 is in range)
range_check = "exact"

# Scale computed values snap to: "third" or "full" stops.
snap = "third"
"##
}

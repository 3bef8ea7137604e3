use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Half-open admissible range `(lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
}

impl Band {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        value > self.lower && value <= self.upper
    }
}

/// Admissible ranges for user-supplied dimensions.
///
/// A `None` band disables the range check; positivity is always enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProportionLimits {
    pub diameter: Option<Band>,
    pub total_length: Option<Band>,
}

impl Default for ProportionLimits {
    fn default() -> Self {
        Self {
            diameter: Some(Band::new(20.0, 35.0)),
            total_length: Some(Band::new(20.0, 300.0)),
        }
    }
}

impl ProportionLimits {
    pub fn unbounded() -> Self {
        Self {
            diameter: None,
            total_length: None,
        }
    }

    pub fn check_diameter(&self, value: f64) -> Result<(), ConfigError> {
        check("diameter", value, self.diameter)
    }

    pub fn check_total_length(&self, value: f64) -> Result<(), ConfigError> {
        check("total length", value, self.total_length)
    }
}

fn check(what: &'static str, value: f64, band: Option<Band>) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::NonPositive { what, value });
    }
    match band {
        Some(b) if !b.contains(value) => Err(ConfigError::OutOfBand {
            what,
            value,
            lower: b.lower,
            upper: b.upper,
        }),
        _ => Ok(()),
    }
}

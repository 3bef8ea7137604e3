use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shaft_ops::{BuilderSettings, ShaftBuilder};
use shaft_proportions::{
    ConfigError, ProportionLimits, ShaftProportions, REFERENCE_BASE_DIAMETER, REFERENCE_SEGMENTS,
};

/// Every input needed to regenerate a shaft.
///
/// Only diameters the user pinned are stored; everything else is derived
/// again from `base_diameter` when the design is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaftDesign {
    pub total_length: f64,
    /// Base diameter for segments without an override, used while neither
    /// keyway seat is pinned.
    #[serde(default = "default_base_diameter")]
    pub base_diameter: f64,
    /// Pinned diameter of the first keyway seat (segment 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_keyway_diameter: Option<f64>,
    /// Pinned diameter of the second keyway seat (segment 9).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_keyway_diameter: Option<f64>,
    /// Further per-segment diameter overrides, by segment index.
    #[serde(default)]
    pub diameter_overrides: BTreeMap<usize, f64>,
    #[serde(default)]
    pub settings: BuilderSettings,
    #[serde(default)]
    pub limits: ProportionLimits,
}

fn default_base_diameter() -> f64 {
    REFERENCE_BASE_DIAMETER
}

impl Default for ShaftDesign {
    fn default() -> Self {
        Self {
            total_length: 230.0,
            base_diameter: REFERENCE_BASE_DIAMETER,
            first_keyway_diameter: Some(23.0),
            second_keyway_diameter: Some(27.0),
            diameter_overrides: BTreeMap::new(),
            settings: BuilderSettings::default(),
            limits: ProportionLimits::default(),
        }
    }
}

impl ShaftDesign {
    /// Capture the current state of a proportions table.
    pub fn from_proportions(proportions: &ShaftProportions, settings: BuilderSettings) -> Self {
        let mut diameter_overrides: BTreeMap<usize, f64> = proportions.custom_diameters().collect();
        let first_keyway_diameter = diameter_overrides.remove(&REFERENCE_SEGMENTS[0]);
        let second_keyway_diameter = diameter_overrides.remove(&REFERENCE_SEGMENTS[1]);
        Self {
            total_length: proportions.total_length(),
            base_diameter: proportions.nominal_base_diameter(),
            first_keyway_diameter,
            second_keyway_diameter,
            diameter_overrides,
            settings,
            limits: *proportions.limits(),
        }
    }

    /// Validated proportions table for this design.
    pub fn proportions(&self) -> Result<ShaftProportions, ConfigError> {
        let mut proportions =
            ShaftProportions::scaled(self.total_length, self.base_diameter, self.limits)?;
        let pinned = [
            (REFERENCE_SEGMENTS[0], self.first_keyway_diameter),
            (REFERENCE_SEGMENTS[1], self.second_keyway_diameter),
        ];
        for (index, diameter) in pinned {
            if let Some(diameter) = diameter {
                proportions.set_custom_diameter(index, diameter)?;
            }
        }
        for (&index, &diameter) in &self.diameter_overrides {
            proportions.set_custom_diameter(index, diameter)?;
        }
        Ok(proportions)
    }

    pub fn builder(&self) -> ShaftBuilder {
        ShaftBuilder::new(self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_design_is_the_reference_shaft() {
        let p = ShaftDesign::default().proportions().unwrap();
        assert_eq!(p.segment_count(), 13);
        assert!((p.base_diameter() - 23.0).abs() < 1e-12);
    }

    #[test]
    fn overrides_are_validated() {
        let mut design = ShaftDesign::default();
        design.diameter_overrides.insert(42, 25.0);
        assert!(matches!(
            design.proportions(),
            Err(ConfigError::SegmentIndexOutOfRange { index: 42, .. })
        ));
    }

    #[test]
    fn capture_reproduces_the_table() {
        let mut p = ShaftDesign::default().proportions().unwrap();
        p.set_custom_diameter(3, 25.0).unwrap();
        p.set_custom_diameter(11, 28.0).unwrap();
        p.set_total_length(250.0).unwrap();

        let design = ShaftDesign::from_proportions(&p, BuilderSettings::default());
        assert_eq!(design.first_keyway_diameter, Some(25.0));
        assert_eq!(design.diameter_overrides.len(), 1);

        let restored = design.proportions().unwrap();
        let a: Vec<_> = p.segments().collect();
        let b: Vec<_> = restored.segments().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn only_pinned_diameters_are_recorded() {
        let limits = ProportionLimits::default();
        let scaled = ShaftProportions::with_base_diameter(27.6, limits).unwrap();
        let design = ShaftDesign::from_proportions(&scaled, BuilderSettings::default());
        assert_eq!(design.first_keyway_diameter, None);
        assert_eq!(design.second_keyway_diameter, None);
        assert!(design.diameter_overrides.is_empty());
        assert_eq!(design.base_diameter, 27.6);

        let restored = design.proportions().unwrap();
        assert_eq!(restored.custom_diameters().count(), 0);
        assert_eq!(
            restored.segments().collect::<Vec<_>>(),
            scaled.segments().collect::<Vec<_>>()
        );
    }

    #[test]
    fn cleared_override_stays_cleared() {
        let mut p = ShaftDesign::default().proportions().unwrap();
        p.clear_custom_diameter(3).unwrap();

        let design = ShaftDesign::from_proportions(&p, BuilderSettings::default());
        assert_eq!(design.first_keyway_diameter, None);
        assert_eq!(design.second_keyway_diameter, Some(27.0));

        let restored = design.proportions().unwrap();
        let before: Vec<_> = p.custom_diameters().collect();
        let after: Vec<_> = restored.custom_diameters().collect();
        assert_eq!(before, after);
        assert!((restored.base_diameter() - p.base_diameter()).abs() < 1e-12);
    }
}

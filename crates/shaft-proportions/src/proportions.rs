use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::catalog::{
    default_catalog, default_slots, SegmentKind, SegmentProportion, SlotProportion,
    CHAMFER_LENGTH_RATIO, REFERENCE_BASE_DIAMETER, REFERENCE_SEGMENTS, REFERENCE_TOTAL_LENGTH,
};
use crate::error::ConfigError;
use crate::limits::ProportionLimits;

/// Resolved dimensions of one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentInfo {
    pub name: &'static str,
    pub kind: SegmentKind,
    pub length: f64,
    pub diameter: f64,
    /// Far-end diameter, present only for cones.
    pub diameter_end: Option<f64>,
    pub needs_reduction: bool,
}

/// Resolved dimensions of one keyway.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlotInfo {
    pub width: f64,
    pub depth: f64,
    pub length: f64,
    /// Distance from the host segment's start.
    pub offset: f64,
    pub host_segment: usize,
}

/// Proportions table: derives every segment and slot dimension from the
/// total length, the base diameter and any per-segment diameter overrides.
#[derive(Debug, Clone)]
pub struct ShaftProportions {
    catalog: Vec<SegmentProportion>,
    slots: Vec<SlotProportion>,
    nominal_base_diameter: f64,
    total_length: f64,
    overrides: BTreeMap<usize, f64>,
    limits: ProportionLimits,
}

impl ShaftProportions {
    /// Table for a shaft of `total_length` whose two keyway seats have the
    /// given diameters.
    #[instrument(skip(limits))]
    pub fn new(
        total_length: f64,
        first_keyway_diameter: f64,
        second_keyway_diameter: f64,
        limits: ProportionLimits,
    ) -> Result<Self, ConfigError> {
        limits.check_total_length(total_length)?;
        limits.check_diameter(first_keyway_diameter)?;
        limits.check_diameter(second_keyway_diameter)?;

        let mut overrides = BTreeMap::new();
        overrides.insert(REFERENCE_SEGMENTS[0], first_keyway_diameter);
        overrides.insert(REFERENCE_SEGMENTS[1], second_keyway_diameter);

        let table = Self {
            catalog: default_catalog(),
            slots: default_slots(),
            nominal_base_diameter: REFERENCE_BASE_DIAMETER,
            total_length,
            overrides,
            limits,
        };
        info!(
            base_diameter = table.base_diameter(),
            "proportions table created"
        );
        Ok(table)
    }

    /// Uniformly scaled reference design with base diameter `base` and no
    /// overrides. The total length keeps the reference length/base ratio.
    pub fn with_base_diameter(base: f64, limits: ProportionLimits) -> Result<Self, ConfigError> {
        limits.check_diameter(base)?;
        let total_length = REFERENCE_TOTAL_LENGTH * base / REFERENCE_BASE_DIAMETER;
        limits
            .check_total_length(total_length)
            .map_err(|e| match e {
                ConfigError::OutOfBand { lower, upper, .. } => {
                    ConfigError::DerivedLengthOutOfBand {
                        base,
                        length: total_length,
                        lower,
                        upper,
                    }
                }
                other => other,
            })?;
        Self::scaled(total_length, base, limits)
    }

    /// Table of `total_length` scaled from base diameter `base`, with no
    /// overrides.
    pub fn scaled(total_length: f64, base: f64, limits: ProportionLimits) -> Result<Self, ConfigError> {
        limits.check_total_length(total_length)?;
        limits.check_diameter(base)?;

        Ok(Self {
            catalog: default_catalog(),
            slots: default_slots(),
            nominal_base_diameter: base,
            total_length,
            overrides: BTreeMap::new(),
            limits,
        })
    }

    pub fn segment_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn limits(&self) -> &ProportionLimits {
        &self.limits
    }

    /// Base diameter recomputed from the overrides: the first reference
    /// segment that carries an override wins, otherwise the nominal base.
    pub fn base_diameter(&self) -> f64 {
        REFERENCE_SEGMENTS
            .iter()
            .find_map(|&idx| {
                self.overrides
                    .get(&idx)
                    .map(|d| d / self.catalog[idx].diameter_ratio)
            })
            .unwrap_or(self.nominal_base_diameter)
    }

    /// Base diameter used when no reference segment carries an override.
    pub fn nominal_base_diameter(&self) -> f64 {
        self.nominal_base_diameter
    }

    pub fn scale_factor(&self) -> f64 {
        self.base_diameter() / REFERENCE_BASE_DIAMETER
    }

    pub fn chamfer_length(&self) -> f64 {
        CHAMFER_LENGTH_RATIO * self.base_diameter()
    }

    fn entry(&self, index: usize) -> Result<&SegmentProportion, ConfigError> {
        self.catalog
            .get(index)
            .ok_or(ConfigError::SegmentIndexOutOfRange {
                index,
                count: self.catalog.len(),
            })
    }

    pub fn segment_info(&self, index: usize) -> Result<SegmentInfo, ConfigError> {
        let entry = self.entry(index)?;
        let base = self.base_diameter();
        let diameter = self
            .overrides
            .get(&index)
            .copied()
            .unwrap_or(entry.diameter_ratio * base);
        let diameter_end = match entry.kind {
            SegmentKind::Cone => Some(entry.diameter_end_ratio * base),
            SegmentKind::Cylinder => None,
        };

        Ok(SegmentInfo {
            name: entry.name,
            kind: entry.kind,
            length: entry.length_ratio * self.total_length,
            diameter,
            diameter_end,
            needs_reduction: entry.needs_reduction,
        })
    }

    pub fn segment_name(&self, index: usize) -> Result<&'static str, ConfigError> {
        Ok(self.entry(index)?.name)
    }

    pub fn segment_diameter(&self, index: usize) -> Result<f64, ConfigError> {
        Ok(self.segment_info(index)?.diameter)
    }

    /// All segments in axial order.
    pub fn segments(&self) -> impl Iterator<Item = SegmentInfo> + '_ {
        (0..self.catalog.len()).filter_map(move |i| self.segment_info(i).ok())
    }

    /// Explicit diameter overrides, by segment index.
    pub fn custom_diameters(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.overrides.iter().map(|(&i, &d)| (i, d))
    }

    /// Pin the diameter of one segment. Pinning a reference segment rescales
    /// every segment that has no override of its own.
    #[instrument(skip(self))]
    pub fn set_custom_diameter(&mut self, index: usize, diameter: f64) -> Result<(), ConfigError> {
        self.entry(index)?;
        self.limits.check_diameter(diameter)?;

        let previous_base = self.base_diameter();
        self.overrides.insert(index, diameter);

        if REFERENCE_SEGMENTS.contains(&index) {
            let base = self.base_diameter();
            info!(
                index,
                previous_base,
                base,
                factor = base / previous_base,
                "reference diameter changed, shaft rescaled"
            );
        } else {
            debug!(index, diameter, "custom diameter recorded");
        }
        Ok(())
    }

    /// Drop an override. Returns whether one was present.
    pub fn clear_custom_diameter(&mut self, index: usize) -> Result<bool, ConfigError> {
        self.entry(index)?;
        let removed = self.overrides.remove(&index).is_some();
        if removed {
            debug!(index, base = self.base_diameter(), "custom diameter cleared");
        }
        Ok(removed)
    }

    #[instrument(skip(self))]
    pub fn set_total_length(&mut self, length: f64) -> Result<(), ConfigError> {
        self.limits.check_total_length(length)?;
        info!(previous = self.total_length, length, "total length changed");
        self.total_length = length;
        Ok(())
    }

    pub fn slot_info(&self, index: usize) -> Result<SlotInfo, ConfigError> {
        let slot = self
            .slots
            .get(index)
            .ok_or(ConfigError::SlotIndexOutOfRange {
                index,
                count: self.slots.len(),
            })?;
        let k = self.scale_factor();

        Ok(SlotInfo {
            width: slot.width * k,
            depth: slot.depth * k,
            length: slot.length * k,
            offset: slot.offset,
            host_segment: slot.host_segment,
        })
    }

    pub fn slots(&self) -> impl Iterator<Item = SlotInfo> + '_ {
        (0..self.slots.len()).filter_map(move |i| self.slot_info(i).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference() -> ShaftProportions {
        ShaftProportions::new(230.0, 23.0, 27.0, ProportionLimits::default()).unwrap()
    }

    #[test]
    fn reference_design_reproduces_catalog() {
        let p = reference();
        assert_eq!(p.segment_count(), 13);
        assert_relative_eq!(p.base_diameter(), 23.0);

        let first = p.segment_info(0).unwrap();
        assert_eq!(first.name, "Cylinder 1");
        assert_relative_eq!(first.length, 18.0, epsilon = 1e-9);
        assert_relative_eq!(first.diameter, 23.0, epsilon = 1e-9);

        let cone = p.segment_info(6).unwrap();
        assert_eq!(cone.kind, SegmentKind::Cone);
        assert_relative_eq!(cone.diameter, 35.0, epsilon = 1e-9);
        assert_relative_eq!(cone.diameter_end.unwrap(), 40.0, epsilon = 1e-9);
        assert!(p.segment_info(5).unwrap().diameter_end.is_none());
    }

    #[test]
    fn first_reference_takes_priority() {
        let mut p = reference();
        p.set_custom_diameter(9, 30.0).unwrap();
        // Segment 3 still pins the base
        assert_relative_eq!(p.base_diameter(), 23.0);

        p.clear_custom_diameter(3).unwrap();
        assert_relative_eq!(p.base_diameter(), 30.0 * 23.0 / 27.0, epsilon = 1e-9);
    }

    #[test]
    fn chamfer_length_scales_with_base() {
        let p = ShaftProportions::with_base_diameter(23.0, ProportionLimits::default()).unwrap();
        assert_relative_eq!(p.chamfer_length(), 0.025, epsilon = 1e-12);
        assert_relative_eq!(p.total_length(), 230.0, epsilon = 1e-9);
    }

    #[test]
    fn slot_offset_is_not_scaled() {
        let mut p = reference();
        p.set_custom_diameter(3, 34.5).unwrap();
        let slot = p.slot_info(0).unwrap();
        assert_relative_eq!(slot.width, 12.0, epsilon = 1e-9);
        assert_relative_eq!(slot.depth, 7.5, epsilon = 1e-9);
        assert_relative_eq!(slot.length, 15.0, epsilon = 1e-9);
        assert_relative_eq!(slot.offset, 8.5);
        assert!(matches!(
            p.slot_info(2),
            Err(ConfigError::SlotIndexOutOfRange { index: 2, count: 2 })
        ));
    }
}

//! The fixed proportions catalog of the shaft family.
//!
//! All entries are derived from a 230 mm reference shaft with a Ø23 base.

use serde::{Deserialize, Serialize};

/// Total length of the reference design.
pub const REFERENCE_TOTAL_LENGTH: f64 = 230.0;

/// Base diameter of the reference design; every diameter ratio is relative to it.
pub const REFERENCE_BASE_DIAMETER: f64 = 23.0;

/// Segments whose diameter drives the base diameter, in priority order.
pub const REFERENCE_SEGMENTS: [usize; 2] = [3, 9];

/// Axial chamfer length per unit of base diameter.
pub const CHAMFER_LENGTH_RATIO: f64 = 0.025 / REFERENCE_BASE_DIAMETER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Cylinder,
    Cone,
}

/// One catalog entry. Ratios are relative to total length and base diameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentProportion {
    pub name: &'static str,
    pub kind: SegmentKind,
    pub length_ratio: f64,
    pub diameter_ratio: f64,
    /// Diameter ratio at the far end of a cone. Equal to `diameter_ratio` for cylinders.
    pub diameter_end_ratio: f64,
    /// Segment is turned down by the fit-clearance tolerance when built.
    pub needs_reduction: bool,
}

/// Keyway proportions. Width, depth and length are in reference units and
/// scale with the base diameter; `offset` is measured from the host
/// segment's start and does not scale.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotProportion {
    pub width: f64,
    pub depth: f64,
    pub length: f64,
    pub offset: f64,
    pub host_segment: usize,
}

// (name, kind, length, start diameter, end diameter, reduction)
const REFERENCE_SEGMENTS_TABLE: [(&str, SegmentKind, f64, f64, f64, bool); 13] = [
    ("Cylinder 1", SegmentKind::Cylinder, 18.0, 23.0, 23.0, false),
    ("Cylinder 2", SegmentKind::Cylinder, 15.0, 25.0, 25.0, false),
    ("Cylinder 3", SegmentKind::Cylinder, 3.0, 23.0, 23.0, true),
    ("Cylinder 4", SegmentKind::Cylinder, 27.0, 23.0, 23.0, false),
    ("Cylinder 5", SegmentKind::Cylinder, 3.0, 23.0, 23.0, true),
    ("Cylinder 6", SegmentKind::Cylinder, 14.0, 35.0, 35.0, false),
    ("Cone", SegmentKind::Cone, 5.0, 35.0, 40.0, false),
    ("Cylinder 7", SegmentKind::Cylinder, 40.0, 40.0, 40.0, false),
    ("Cylinder 8", SegmentKind::Cylinder, 3.0, 23.0, 23.0, true),
    ("Cylinder 9", SegmentKind::Cylinder, 59.0, 27.0, 27.0, false),
    ("Cylinder 10", SegmentKind::Cylinder, 3.0, 23.0, 23.0, false),
    ("Cylinder 11", SegmentKind::Cylinder, 21.0, 25.0, 25.0, false),
    ("Cylinder 12", SegmentKind::Cylinder, 19.0, 23.0, 23.0, false),
];

/// The 13-entry default catalog, in axial order.
pub fn default_catalog() -> Vec<SegmentProportion> {
    REFERENCE_SEGMENTS_TABLE
        .iter()
        .map(
            |&(name, kind, length, d_start, d_end, needs_reduction)| SegmentProportion {
                name,
                kind,
                length_ratio: length / REFERENCE_TOTAL_LENGTH,
                diameter_ratio: d_start / REFERENCE_BASE_DIAMETER,
                diameter_end_ratio: d_end / REFERENCE_BASE_DIAMETER,
                needs_reduction,
            },
        )
        .collect()
}

/// The two default keyways: one on Cylinder 4, one on Cylinder 9.
pub fn default_slots() -> Vec<SlotProportion> {
    vec![
        SlotProportion {
            width: 8.0,
            depth: 5.0,
            length: 10.0,
            offset: 8.5,
            host_segment: 3,
        },
        SlotProportion {
            width: 8.0,
            depth: 4.0,
            length: 22.0,
            offset: 8.0,
            host_segment: 9,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn length_ratios_sum_to_one() {
        let sum: f64 = default_catalog().iter().map(|s| s.length_ratio).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn only_the_cone_changes_diameter() {
        for entry in default_catalog() {
            match entry.kind {
                SegmentKind::Cone => assert!(entry.diameter_end_ratio > entry.diameter_ratio),
                SegmentKind::Cylinder => {
                    assert_eq!(entry.diameter_ratio, entry.diameter_end_ratio)
                }
            }
        }
    }

    #[test]
    fn slot_hosts_are_reference_segments() {
        let hosts: Vec<usize> = default_slots().iter().map(|s| s.host_segment).collect();
        assert_eq!(hosts, REFERENCE_SEGMENTS.to_vec());
    }
}

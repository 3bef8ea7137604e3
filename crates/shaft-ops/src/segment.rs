use geom_kernel::{KernelBundle, KernelError, KernelSolidHandle};
use serde::Serialize;

/// Shaft axis.
pub const AXIS: [f64; 3] = [0.0, 0.0, 1.0];

/// Cross-section of a segment along the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SegmentProfile {
    Cylinder { radius: f64 },
    Cone { radius_start: f64, radius_end: f64 },
}

/// One axial slice of the shaft, starting at `z_start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShaftSegment {
    pub z_start: f64,
    pub length: f64,
    pub profile: SegmentProfile,
}

impl ShaftSegment {
    pub fn z_end(&self) -> f64 {
        self.z_start + self.length
    }

    pub fn start_radius(&self) -> f64 {
        match self.profile {
            SegmentProfile::Cylinder { radius } => radius,
            SegmentProfile::Cone { radius_start, .. } => radius_start,
        }
    }

    pub fn end_radius(&self) -> f64 {
        match self.profile {
            SegmentProfile::Cylinder { radius } => radius,
            SegmentProfile::Cone { radius_end, .. } => radius_end,
        }
    }

    pub fn is_cylinder(&self) -> bool {
        matches!(self.profile, SegmentProfile::Cylinder { .. })
    }

    /// Build the segment solid around the Z axis.
    pub fn shape(&self, kb: &mut dyn KernelBundle) -> Result<KernelSolidHandle, KernelError> {
        let origin = [0.0, 0.0, self.z_start];
        match self.profile {
            SegmentProfile::Cylinder { radius } => {
                kb.make_cylinder(origin, AXIS, radius, self.length)
            }
            SegmentProfile::Cone {
                radius_start,
                radius_end,
            } => kb.make_cone(origin, AXIS, radius_start, radius_end, self.length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom_kernel::{MockKernel, MockOp};

    #[test]
    fn cone_radii_by_end() {
        let seg = ShaftSegment {
            z_start: 10.0,
            length: 5.0,
            profile: SegmentProfile::Cone {
                radius_start: 17.5,
                radius_end: 20.0,
            },
        };
        assert_eq!(seg.z_end(), 15.0);
        assert_eq!(seg.start_radius(), 17.5);
        assert_eq!(seg.end_radius(), 20.0);
        assert!(!seg.is_cylinder());
    }

    #[test]
    fn shape_is_placed_at_z_start() {
        let mut kernel = MockKernel::new();
        let seg = ShaftSegment {
            z_start: 3.0,
            length: 2.0,
            profile: SegmentProfile::Cylinder { radius: 4.0 },
        };
        seg.shape(&mut kernel).unwrap();
        assert_eq!(
            kernel.operations(),
            &[MockOp::Cylinder {
                origin: [0.0, 0.0, 3.0],
                radius: 4.0,
                length: 2.0
            }]
        );
    }
}

//! Half-sections of solids of revolution.
//!
//! truck's boolean union gives up on the coplanar end discs of two segments
//! that touch end to end. Cylinders and cones therefore remember the
//! radius profile they were revolved from, so coaxial bodies can be fused
//! and chamfered by editing the profile and revolving it again.

use truck_modeling::topology::Solid;

use crate::primitives;
use crate::types::KernelError;

/// Axial and radial distances closer than this are the same point.
const COINCIDENCE: f64 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionEnd {
    Start,
    End,
}

/// Radius profile along an axis: `(offset, radius)` stations with
/// non-decreasing offset, revolved a full turn around `axis` through `origin`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RevolvedSection {
    origin: [f64; 3],
    axis: [f64; 3],
    stations: Vec<(f64, f64)>,
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn push_station(stations: &mut Vec<(f64, f64)>, t: f64, r: f64) {
    match stations.last() {
        Some(&(lt, lr)) if (t - lt).abs() < COINCIDENCE => {
            if (r - lr).abs() >= COINCIDENCE {
                stations.push((lt, r));
            }
        }
        _ => stations.push((t, r)),
    }
}

impl RevolvedSection {
    /// `axis` must be normalized.
    pub fn cone(
        origin: [f64; 3],
        axis: [f64; 3],
        radius_start: f64,
        radius_end: f64,
        length: f64,
    ) -> Self {
        Self {
            origin,
            axis,
            stations: vec![(0.0, radius_start), (length, radius_end)],
        }
    }

    pub fn cylinder(origin: [f64; 3], axis: [f64; 3], radius: f64, length: f64) -> Self {
        Self::cone(origin, axis, radius, radius, length)
    }

    pub fn stations(&self) -> &[(f64, f64)] {
        &self.stations
    }

    fn start(&self) -> f64 {
        self.stations.first().map_or(0.0, |s| s.0)
    }

    fn end(&self) -> f64 {
        self.stations.last().map_or(0.0, |s| s.0)
    }

    /// Axial offset of `p` from the section origin.
    fn offset_of(&self, p: [f64; 3]) -> f64 {
        dot(sub(p, self.origin), self.axis)
    }

    pub fn solid(&self) -> Result<Solid, KernelError> {
        primitives::make_revolved(self.origin, self.axis, &self.stations)
    }

    /// Single section covering both bodies, if they share an axis and touch
    /// end to end. Overlapping or separated bodies give `None`.
    pub fn fuse(&self, other: &RevolvedSection) -> Option<RevolvedSection> {
        if dot(self.axis, other.axis) < 1.0 - 1e-12 {
            return None;
        }
        let shift = self.offset_of(other.origin);
        let along = sub(other.origin, self.origin);
        let off_axis = sub(along, self.axis.map(|c| c * shift));
        if dot(off_axis, off_axis).sqrt() > COINCIDENCE {
            return None;
        }

        let moved: Vec<(f64, f64)> = other.stations.iter().map(|&(t, r)| (t + shift, r)).collect();
        let other_start = moved.first()?.0;
        let other_end = moved.last()?.0;
        let (first, second) = if (self.end() - other_start).abs() < COINCIDENCE {
            (self.stations.clone(), moved)
        } else if (other_end - self.start()).abs() < COINCIDENCE {
            (moved, self.stations.clone())
        } else {
            return None;
        };

        let mut stations = first;
        for (t, r) in second {
            push_station(&mut stations, t, r);
        }
        Some(RevolvedSection {
            origin: self.origin,
            axis: self.axis,
            stations,
        })
    }

    /// End face containing both points, if any.
    pub fn end_containing(&self, a: [f64; 3], b: [f64; 3]) -> Option<SectionEnd> {
        let (ta, tb) = (self.offset_of(a), self.offset_of(b));
        let at = |t: f64| (ta - t).abs() < COINCIDENCE && (tb - t).abs() < COINCIDENCE;
        if at(self.start()) {
            Some(SectionEnd::Start)
        } else if at(self.end()) {
            Some(SectionEnd::End)
        } else {
            None
        }
    }

    /// Bevel the outer rim of one end: `axial` along the shaft, `radial`
    /// into the end face.
    pub fn chamfer(
        &self,
        end: SectionEnd,
        axial: f64,
        radial: f64,
    ) -> Result<RevolvedSection, KernelError> {
        if !(axial > 0.0 && radial > 0.0) {
            return Err(KernelError::ChamferFailed {
                reason: format!("chamfer distances must be positive, got {axial} x {radial}"),
            });
        }

        let mut stations = self.stations.clone();
        if end == SectionEnd::End {
            stations.reverse();
        }
        let &[(t0, r0), (t1, r1), ..] = stations.as_slice() else {
            return Err(KernelError::ChamferFailed {
                reason: "section has no end segment".to_string(),
            });
        };
        let span = (t1 - t0).abs();
        if radial >= r0 {
            return Err(KernelError::ChamferFailed {
                reason: format!("chamfer depth {radial} reaches the axis (end radius {r0})"),
            });
        }
        if axial >= span {
            return Err(KernelError::ChamferFailed {
                reason: format!("chamfer length {axial} exceeds the end segment ({span})"),
            });
        }

        let direction = if t1 > t0 { 1.0 } else { -1.0 };
        let rim = r0 + (r1 - r0) * axial / span;
        stations[0] = (t0, r0 - radial);
        stations.insert(1, (t0 + direction * axial, rim));
        if end == SectionEnd::End {
            stations.reverse();
        }

        Ok(RevolvedSection {
            origin: self.origin,
            axis: self.axis,
            stations,
        })
    }
}

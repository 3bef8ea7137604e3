use geom_kernel::KernelError;
use serde::{Deserialize, Serialize};
use shaft_proportions::ConfigError;

/// Tunables of the build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderSettings {
    /// Axial chamfer length. Replaced by the proportions table on derive.
    pub chamfer_length: f64,
    /// Chamfer angle in degrees.
    pub chamfer_angle_deg: f64,
    /// Diameter removed from fit-clearance segments.
    pub reduction_tolerance: f64,
    /// Max distance of a vertex from an end plane to count as lying on it.
    pub edge_tolerance: f64,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            chamfer_length: 0.025,
            chamfer_angle_deg: 45.0,
            reduction_tolerance: 0.3,
            edge_tolerance: 1e-6,
        }
    }
}

impl BuilderSettings {
    /// Setback handed to the kernel: `chamfer_length * tan(angle)`.
    pub fn chamfer_distance(&self) -> f64 {
        self.chamfer_length * self.chamfer_angle_deg.to_radians().tan()
    }
}

/// Which end of the shaft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShaftEnd {
    Start,
    End,
}

/// A slot shortened to stay within its host segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlotAdjustment {
    pub slot: usize,
    pub requested_length: f64,
    pub clipped_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChamferFailure {
    pub end: ShaftEnd,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotCutFailure {
    pub slot: usize,
    pub reason: String,
}

/// Non-fatal events of the last derive/build cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Recorded by `derive_from_proportions`.
    pub slot_adjustments: Vec<SlotAdjustment>,
    /// Ends where no candidate edge was found.
    pub missing_chamfer_edges: Vec<ShaftEnd>,
    pub failed_chamfers: Vec<ChamferFailure>,
    /// Slots not cut because their length was clipped to zero.
    pub skipped_slots: Vec<usize>,
    pub failed_cuts: Vec<SlotCutFailure>,
}

impl Diagnostics {
    /// True when the last build applied every chamfer and slot as requested.
    pub fn is_clean(&self) -> bool {
        self.slot_adjustments.is_empty()
            && self.missing_chamfer_edges.is_empty()
            && self.failed_chamfers.is_empty()
            && self.skipped_slots.is_empty()
            && self.failed_cuts.is_empty()
    }

    pub(crate) fn reset_build(&mut self) {
        self.missing_chamfer_edges.clear();
        self.failed_chamfers.clear();
        self.skipped_slots.clear();
        self.failed_cuts.clear();
    }
}

/// Errors from shaft construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("no segments to build the shaft")]
    NoSegments,

    #[error("shaft has not been built")]
    NotBuilt,

    #[error("failed to fuse segment {index}: {source}")]
    SegmentFuseFailed {
        index: usize,
        #[source]
        source: KernelError,
    },

    #[error("failed to construct slot {index}: {source}")]
    SlotConstruction {
        index: usize,
        #[source]
        source: KernelError,
    },
}

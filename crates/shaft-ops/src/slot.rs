//! Keyway slots: a box with a rounded cap at each end, sunk into the
//! shaft from the +Y side.

use geom_kernel::{KernelBundle, KernelError, KernelSolidHandle};
use serde::Serialize;
use tracing::debug;

use crate::types::OpError;

/// Direction the slot is sunk along (towards the axis from +Y).
const DEPTH_AXIS: [f64; 3] = [0.0, 1.0, 0.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slot {
    width: f64,
    depth: f64,
    length: f64,
    z_start: f64,
    /// Height of the slot floor above the shaft axis.
    y_offset: f64,
}

impl Slot {
    /// A slot cut into a segment of radius `host_radius`. Zero `length` is
    /// allowed and yields a slot that is never cut.
    pub fn new(
        width: f64,
        depth: f64,
        length: f64,
        z_start: f64,
        host_radius: f64,
    ) -> Result<Self, OpError> {
        if !(width > 0.0 && depth > 0.0) {
            return Err(OpError::InvalidParameter {
                reason: format!("slot width and depth must be positive, got {width} x {depth}"),
            });
        }
        if length < 0.0 {
            return Err(OpError::InvalidParameter {
                reason: format!("slot length must not be negative, got {length}"),
            });
        }
        if depth > host_radius {
            return Err(OpError::InvalidParameter {
                reason: format!("slot depth {depth} exceeds host radius {host_radius}"),
            });
        }

        let y_offset = host_radius - depth;
        debug!(host_radius, y_offset, "slot created");
        Ok(Self {
            width,
            depth,
            length,
            z_start,
            y_offset,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn z_start(&self) -> f64 {
        self.z_start
    }

    pub fn z_end(&self) -> f64 {
        self.z_start + self.length
    }

    pub fn y_offset(&self) -> f64 {
        self.y_offset
    }

    /// Build the cutting tool: box `width x depth x length` fused with a
    /// `width/2` cylinder at each end.
    pub fn shape(&self, kb: &mut dyn KernelBundle) -> Result<KernelSolidHandle, KernelError> {
        let half = self.width / 2.0;

        let body = kb.make_box(
            [-half, self.y_offset, self.z_start],
            self.width,
            self.depth,
            self.length,
        )?;
        let near_cap = kb.make_cylinder(
            [0.0, self.y_offset, self.z_start],
            DEPTH_AXIS,
            half,
            self.depth,
        )?;
        let far_cap = kb.make_cylinder(
            [0.0, self.y_offset, self.z_end()],
            DEPTH_AXIS,
            half,
            self.depth,
        )?;

        let partial = kb.boolean_union(&body, &near_cap)?;
        kb.boolean_union(&partial, &far_cap)
    }
}

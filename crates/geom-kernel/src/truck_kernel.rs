//! TruckKernel: real geometry kernel wrapping truck's API.

use crate::primitives;
use crate::revolved::{RevolvedSection, SectionEnd};
use crate::traits::Kernel;
use crate::types::*;
use std::collections::HashMap;

use tracing::debug;
use truck_modeling::topology::Solid;
use truck_stepio::out::{CompleteStepDisplay, StepHeaderDescriptor, StepModel};

/// Tolerance handed to truck's boolean operations.
const BOOLEAN_TOLERANCE: f64 = 0.05;

/// A stored body.
///
/// `pieces` holds a single solid, or several when truck could not fuse
/// them. A body in pieces can still be cut away from another solid, one
/// piece at a time, but cannot be cut, chamfered or exported itself.
struct Body {
    pieces: Vec<Solid>,
    /// Profile of a solid of revolution, for exact coaxial fusing and
    /// rim chamfers.
    section: Option<RevolvedSection>,
}

impl Body {
    fn plain(solid: Solid) -> Self {
        Self {
            pieces: vec![solid],
            section: None,
        }
    }

    fn revolved(solid: Solid, section: RevolvedSection) -> Self {
        Self {
            pieces: vec![solid],
            section: Some(section),
        }
    }

    fn single(&self) -> Option<&Solid> {
        match self.pieces.as_slice() {
            [solid] => Some(solid),
            _ => None,
        }
    }
}

/// Real geometry kernel backed by the truck BREP library.
pub struct TruckKernel {
    next_handle: u64,
    bodies: HashMap<u64, Body>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            bodies: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn store(&mut self, body: Body) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.bodies.insert(handle.id(), body);
        handle
    }

    /// The solid behind a handle, unless the body is still in pieces.
    pub(crate) fn get_solid(&self, handle: &KernelSolidHandle) -> Option<&Solid> {
        self.bodies.get(&handle.id())?.single()
    }

    fn body(&self, handle: &KernelSolidHandle) -> Result<&Body, KernelError> {
        self.bodies.get(&handle.id()).ok_or(KernelError::EntityNotFound {
            id: KernelId(handle.id()),
        })
    }

    fn unfused(handle: &KernelSolidHandle, body: &Body) -> String {
        format!(
            "solid {} is {} unfused pieces",
            handle.id(),
            body.pieces.len()
        )
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for TruckKernel {
    fn make_cylinder(
        &mut self,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        radius: f64,
        length: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let axis = normalized_axis(axis_direction)?;
        require_positive("cylinder radius", radius)?;
        require_positive("cylinder length", length)?;

        let solid = primitives::make_cylinder(axis_origin, axis, radius, length)?;
        let section = RevolvedSection::cylinder(axis_origin, axis, radius, length);
        Ok(self.store(Body::revolved(solid, section)))
    }

    fn make_cone(
        &mut self,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        radius_start: f64,
        radius_end: f64,
        length: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let axis = normalized_axis(axis_direction)?;
        require_positive("cone length", length)?;
        if radius_start < 0.0 || radius_end < 0.0 {
            return Err(KernelError::InvalidPrimitive {
                reason: format!("negative cone radius {radius_start} -> {radius_end}"),
            });
        }

        let section = RevolvedSection::cone(axis_origin, axis, radius_start, radius_end, length);
        let solid = section.solid()?;
        Ok(self.store(Body::revolved(solid, section)))
    }

    fn make_box(
        &mut self,
        origin: [f64; 3],
        dx: f64,
        dy: f64,
        dz: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        require_positive("box width", dx)?;
        require_positive("box height", dy)?;
        require_positive("box depth", dz)?;

        let solid = primitives::make_box(origin, dx, dy, dz);
        Ok(self.store(Body::plain(solid)))
    }

    /// Coaxial solids of revolution that touch end to end are revolved
    /// again from their joined profile. Anything else goes through truck's
    /// `or()`; when that finds no result the operands are kept as pieces.
    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let body_a = self.body(a)?;
        let body_b = self.body(b)?;

        let merged = match (&body_a.section, &body_b.section) {
            (Some(sa), Some(sb)) => sa.fuse(sb),
            _ => None,
        };
        if let Some(section) = merged {
            let solid = section.solid()?;
            debug!(
                stations = section.stations().len(),
                "coaxial bodies fused into one revolve"
            );
            return Ok(self.store(Body::revolved(solid, section)));
        }

        if let (Some(solid_a), Some(solid_b)) = (body_a.single(), body_b.single()) {
            if let Some(result) = truck_shapeops::or(solid_a, solid_b, BOOLEAN_TOLERANCE) {
                return Ok(self.store(Body::plain(result)));
            }
            debug!(a = a.id(), b = b.id(), "truck or() returned None, keeping pieces");
        }

        let pieces: Vec<Solid> = body_a
            .pieces
            .iter()
            .chain(&body_b.pieces)
            .cloned()
            .collect();
        Ok(self.store(Body {
            pieces,
            section: None,
        }))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let target = self.body(a)?;
        let mut result = target
            .single()
            .ok_or_else(|| KernelError::BooleanFailed {
                reason: Self::unfused(a, target),
            })?
            .clone();

        // Subtraction = A ∩ ¬B, once per tool piece. not() mutates in place.
        for (index, piece) in self.body(b)?.pieces.iter().enumerate() {
            let mut tool = piece.clone();
            tool.not();
            result = truck_shapeops::and(&result, &tool, BOOLEAN_TOLERANCE).ok_or_else(|| {
                debug!(a = a.id(), b = b.id(), piece = index, "truck and() returned None");
                KernelError::BooleanFailed {
                    reason: format!("truck and() returned None for subtraction of piece {index}"),
                }
            })?;
        }
        Ok(self.store(Body::plain(result)))
    }

    /// Only the outer rim at either end of a solid of revolution can be
    /// chamfered. An edge is taken to mean the rim of the end face it lies
    /// in. `distance1` runs along the axis, `distance2` into the end face.
    fn chamfer_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        distance1: f64,
        distance2: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let body = self.body(solid)?;
        let Some(section) = body.section.as_ref().filter(|_| body.single().is_some()) else {
            return Err(KernelError::NotSupported {
                operation: format!("chamfer_edges on solid {} (not a solid of revolution)", solid.id()),
            });
        };

        let mut ends: Vec<SectionEnd> = Vec::new();
        for &edge in edges {
            let (owner, a, b) = self
                .edge_endpoints(edge)
                .filter(|(owner, _, _)| owner == solid)
                .ok_or(KernelError::EntityNotFound { id: edge })?;
            let end = section.end_containing(a, b).ok_or_else(|| KernelError::ChamferFailed {
                reason: format!("edge {:?} of solid {} is not on an end face", edge, owner.id()),
            })?;
            if !ends.contains(&end) {
                ends.push(end);
            }
        }

        let mut chamfered = section.clone();
        for end in ends {
            chamfered = chamfered.chamfer(end, distance1, distance2)?;
            debug!(?end, distance1, distance2, "rim chamfered");
        }
        let result = chamfered.solid()?;
        Ok(self.store(Body::revolved(result, chamfered)))
    }

    fn export_step(
        &self,
        solid: &KernelSolidHandle,
        file_name: &str,
    ) -> Result<String, KernelError> {
        let body = self.body(solid)?;
        let truck_solid = body.single().ok_or_else(|| KernelError::ExportFailed {
            reason: Self::unfused(solid, body),
        })?;
        let compressed = truck_solid.compress();
        let display = CompleteStepDisplay::new(
            StepModel::from(&compressed),
            StepHeaderDescriptor {
                file_name: file_name.to_string(),
                ..Default::default()
            },
        );
        Ok(display.to_string())
    }
}

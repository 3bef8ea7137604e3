use geom_kernel::{KernelBundle, KernelSolidHandle};
use shaft_proportions::{SegmentKind, ShaftProportions};
use tracing::{debug, info, instrument, warn};

use crate::chamfer::find_end_edge;
use crate::segment::{SegmentProfile, ShaftSegment};
use crate::slot::Slot;
use crate::types::{
    BuilderSettings, ChamferFailure, Diagnostics, OpError, ShaftEnd, SlotAdjustment,
    SlotCutFailure,
};

/// Assembles the shaft solid: fuses segments in axial order, chamfers both
/// ends and cuts the keyways.
///
/// Segments and slots are either scripted with the `add_*` methods or
/// derived in one go from a [`ShaftProportions`] table.
#[derive(Debug, Clone, Default)]
pub struct ShaftBuilder {
    settings: BuilderSettings,
    segments: Vec<ShaftSegment>,
    slots: Vec<Slot>,
    /// Z where the next auto-placed segment starts.
    cursor: f64,
    final_solid: Option<KernelSolidHandle>,
    diagnostics: Diagnostics,
}

fn require_positive(what: &str, value: f64) -> Result<(), OpError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(OpError::InvalidParameter {
            reason: format!("{what} must be positive, got {value}"),
        })
    }
}

impl ShaftBuilder {
    pub fn new(settings: BuilderSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &BuilderSettings {
        &self.settings
    }

    pub fn segments(&self) -> &[ShaftSegment] {
        &self.segments
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Solid produced by the last successful `build`.
    pub fn final_solid(&self) -> Option<&KernelSolidHandle> {
        self.final_solid.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Overall length of the scripted segments.
    pub fn length(&self) -> f64 {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => last.z_end() - first.z_start,
            _ => 0.0,
        }
    }

    fn push_segment(&mut self, length: f64, z_start: Option<f64>, profile: SegmentProfile) {
        let z_start = z_start.unwrap_or(self.cursor);
        let segment = ShaftSegment {
            z_start,
            length,
            profile,
        };
        debug!(
            z_start,
            z_end = segment.z_end(),
            ?profile,
            "segment added"
        );
        self.cursor = segment.z_end();
        self.segments.push(segment);
    }

    /// Append a cylinder. Without `z_start` it continues from the previous
    /// segment's end.
    pub fn add_cylinder(
        &mut self,
        length: f64,
        diameter: f64,
        z_start: Option<f64>,
    ) -> Result<(), OpError> {
        require_positive("cylinder length", length)?;
        require_positive("cylinder diameter", diameter)?;
        self.push_segment(
            length,
            z_start,
            SegmentProfile::Cylinder {
                radius: diameter / 2.0,
            },
        );
        Ok(())
    }

    pub fn add_cone(
        &mut self,
        length: f64,
        diameter_start: f64,
        diameter_end: f64,
        z_start: Option<f64>,
    ) -> Result<(), OpError> {
        require_positive("cone length", length)?;
        require_positive("cone start diameter", diameter_start)?;
        require_positive("cone end diameter", diameter_end)?;
        self.push_segment(
            length,
            z_start,
            SegmentProfile::Cone {
                radius_start: diameter_start / 2.0,
                radius_end: diameter_end / 2.0,
            },
        );
        Ok(())
    }

    /// Turn a cylinder down by `tolerance` on its diameter, keeping its
    /// position and length.
    pub fn reduce_cylinder_diameter(&mut self, index: usize, tolerance: f64) -> Result<(), OpError> {
        let count = self.segments.len();
        let segment = self
            .segments
            .get_mut(index)
            .ok_or_else(|| OpError::InvalidParameter {
                reason: format!("segment index {index} out of range ({count} segments)"),
            })?;

        let SegmentProfile::Cylinder { radius } = segment.profile else {
            return Err(OpError::InvalidParameter {
                reason: format!("segment {index} is not a cylinder"),
            });
        };
        let diameter = radius * 2.0;
        let reduced = diameter - tolerance;
        require_positive("reduced diameter", reduced)?;

        segment.profile = SegmentProfile::Cylinder {
            radius: reduced / 2.0,
        };
        debug!(index, diameter, reduced, "cylinder reduced");
        Ok(())
    }

    pub fn add_slot(
        &mut self,
        width: f64,
        depth: f64,
        length: f64,
        z_start: f64,
        host_radius: f64,
    ) -> Result<(), OpError> {
        let slot = Slot::new(width, depth, length, z_start, host_radius)?;
        debug!(z_start, z_end = slot.z_end(), width, depth, "slot added");
        self.slots.push(slot);
        Ok(())
    }

    /// Replace all segments and slots with the ones described by the table.
    ///
    /// The two end segments are lengthened by the chamfer length, reduction
    /// segments are turned down by the configured tolerance, and slots that
    /// would run past their host segment are clipped. On error the builder
    /// is left exactly as it was.
    #[instrument(skip_all)]
    pub fn derive_from_proportions(&mut self, proportions: &ShaftProportions) -> Result<(), OpError> {
        let mut staged = ShaftBuilder::new(self.settings);
        staged.settings.chamfer_length = proportions.chamfer_length();

        let count = proportions.segment_count();
        info!(
            count,
            chamfer_length = staged.settings.chamfer_length,
            "deriving shaft from proportions"
        );

        for (i, info) in proportions.segments().enumerate() {
            let mut length = info.length;
            if i == 0 || i + 1 == count {
                length += staged.settings.chamfer_length;
            }
            match info.kind {
                SegmentKind::Cylinder => {
                    staged.add_cylinder(length, info.diameter, None)?;
                    if info.needs_reduction {
                        let last = staged.segments.len() - 1;
                        staged.reduce_cylinder_diameter(last, staged.settings.reduction_tolerance)?;
                    }
                }
                SegmentKind::Cone => {
                    let end = info.diameter_end.unwrap_or(info.diameter);
                    staged.add_cone(length, info.diameter, end, None)?;
                }
            }
        }

        for (i, slot) in proportions.slots().enumerate() {
            let host = staged
                .segments
                .get(slot.host_segment)
                .copied()
                .ok_or_else(|| OpError::InvalidParameter {
                    reason: format!(
                        "slot {i} host segment {} does not exist",
                        slot.host_segment
                    ),
                })?;

            let z_start = host.z_start + slot.offset;
            let mut length = slot.length;
            if z_start + length > host.z_end() {
                let clipped = (host.z_end() - z_start).max(0.0);
                warn!(
                    slot = i,
                    requested = length,
                    clipped,
                    "slot runs past its host segment, length clipped"
                );
                staged.diagnostics.slot_adjustments.push(SlotAdjustment {
                    slot: i,
                    requested_length: length,
                    clipped_length: clipped,
                });
                length = clipped;
            }

            staged.add_slot(slot.width, slot.depth, length, z_start, host.start_radius())?;
        }

        *self = staged;
        Ok(())
    }

    /// Build the solid. Segment fusion failures abort the build; chamfer and
    /// slot cut failures are recorded in [`Diagnostics`] and skipped.
    #[instrument(skip_all, fields(segments = self.segments.len(), slots = self.slots.len()))]
    pub fn build(&mut self, kb: &mut dyn KernelBundle) -> Result<KernelSolidHandle, OpError> {
        let Some(first) = self.segments.first() else {
            return Err(OpError::NoSegments);
        };
        self.final_solid = None;
        self.diagnostics.reset_build();

        let mut solid = first.shape(kb)?;
        for (index, segment) in self.segments.iter().enumerate().skip(1) {
            let part = segment.shape(kb)?;
            solid = kb
                .boolean_union(&solid, &part)
                .map_err(|source| OpError::SegmentFuseFailed { index, source })?;
        }
        info!("segments fused");

        let solid = self.apply_chamfers(kb, solid);
        let solid = self.cut_slots(kb, solid)?;

        info!(clean = self.diagnostics.is_clean(), "shaft built");
        self.final_solid = Some(solid.clone());
        Ok(solid)
    }

    fn apply_chamfers(
        &mut self,
        kb: &mut dyn KernelBundle,
        solid: KernelSolidHandle,
    ) -> KernelSolidHandle {
        let (Some(first), Some(last)) = (self.segments.first(), self.segments.last()) else {
            return solid;
        };
        let ends = [(ShaftEnd::Start, first.z_start), (ShaftEnd::End, last.z_end())];
        let distance = self.settings.chamfer_distance();
        let tolerance = self.settings.edge_tolerance;

        let mut current = solid;
        for (end, plane_z) in ends {
            let Some(edge) = find_end_edge(kb.as_introspect(), &current, plane_z, tolerance) else {
                warn!(?end, plane_z, "no edge found for chamfer");
                self.diagnostics.missing_chamfer_edges.push(end);
                continue;
            };

            match kb.chamfer_edges(&current, &[edge], distance, distance) {
                Ok(chamfered) => {
                    debug!(?end, ?edge, distance, "chamfer applied");
                    current = chamfered;
                }
                Err(e) => {
                    warn!(?end, error = %e, "chamfer failed, continuing without it");
                    self.diagnostics.failed_chamfers.push(ChamferFailure {
                        end,
                        reason: e.to_string(),
                    });
                }
            }
        }
        current
    }

    fn cut_slots(
        &mut self,
        kb: &mut dyn KernelBundle,
        solid: KernelSolidHandle,
    ) -> Result<KernelSolidHandle, OpError> {
        let mut current = solid;
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.length() <= 0.0 {
                warn!(slot = index, "slot has zero length, not cut");
                self.diagnostics.skipped_slots.push(index);
                continue;
            }

            let tool = slot
                .shape(kb)
                .map_err(|source| OpError::SlotConstruction { index, source })?;

            match kb.boolean_subtract(&current, &tool) {
                Ok(cut) => {
                    debug!(slot = index, "slot cut");
                    current = cut;
                }
                Err(e) => {
                    warn!(slot = index, error = %e, "slot cut failed, skipping");
                    self.diagnostics.failed_cuts.push(SlotCutFailure {
                        slot: index,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(current)
    }

    /// STEP text of the built solid.
    pub fn export_step(&self, kb: &dyn KernelBundle, file_name: &str) -> Result<String, OpError> {
        let solid = self.final_solid.as_ref().ok_or(OpError::NotBuilt)?;
        Ok(kb.export_step(solid, file_name)?)
    }
}

use approx::assert_relative_eq;

use geom_kernel::{KernelError, MockKernel, MockOp};
use shaft_ops::{BuilderSettings, OpError, SegmentProfile, ShaftBuilder, ShaftEnd};
use shaft_proportions::{ProportionLimits, ShaftProportions};

fn reference() -> ShaftProportions {
    ShaftProportions::new(230.0, 23.0, 27.0, ProportionLimits::default()).unwrap()
}

fn derived(proportions: &ShaftProportions) -> ShaftBuilder {
    let mut builder = ShaftBuilder::new(BuilderSettings::default());
    builder.derive_from_proportions(proportions).unwrap();
    builder
}

fn is_chamfer(op: &MockOp) -> bool {
    matches!(op, MockOp::Chamfer { .. })
}

// ── Derivation ─────────────────────────────────────────────────────────────

#[test]
fn default_scenario_layout() {
    let builder = derived(&reference());
    let segments = builder.segments();
    assert_eq!(segments.len(), 13);
    assert_eq!(builder.slots().len(), 2);

    assert_relative_eq!(builder.settings().chamfer_length, 0.025, epsilon = 1e-12);
    assert_relative_eq!(segments[0].length, 18.025, epsilon = 1e-9);
    assert_relative_eq!(segments[0].start_radius(), 11.5, epsilon = 1e-9);
    assert_relative_eq!(segments[12].length, 19.025, epsilon = 1e-9);
    assert_relative_eq!(builder.length(), 230.05, epsilon = 1e-9);

    match segments[6].profile {
        SegmentProfile::Cone {
            radius_start,
            radius_end,
        } => {
            assert_relative_eq!(radius_start, 17.5, epsilon = 1e-9);
            assert_relative_eq!(radius_end, 20.0, epsilon = 1e-9);
        }
        other => panic!("segment 6 should be the cone, got {other:?}"),
    }

    // Keyway seats are not relieved; clearance segments are
    assert_relative_eq!(segments[3].start_radius(), 11.5, epsilon = 1e-9);
    for i in [2, 4, 8] {
        assert_relative_eq!(segments[i].start_radius(), 11.35, epsilon = 1e-9);
    }

    // Segments are contiguous
    for pair in segments.windows(2) {
        assert_relative_eq!(pair[0].z_end(), pair[1].z_start, epsilon = 1e-9);
    }
}

#[test]
fn default_slots_sit_on_their_hosts() {
    let builder = derived(&reference());
    let host = builder.segments()[3];
    let slot = builder.slots()[0];

    assert_relative_eq!(slot.z_start(), host.z_start + 8.5, epsilon = 1e-9);
    assert_relative_eq!(slot.length(), 10.0, epsilon = 1e-9);
    assert_relative_eq!(slot.y_offset(), 6.5, epsilon = 1e-9);
    assert!(slot.z_end() <= host.z_end());

    let second = builder.slots()[1];
    assert_relative_eq!(second.z_start(), builder.segments()[9].z_start + 8.0, epsilon = 1e-9);
    assert_relative_eq!(second.y_offset(), 13.5 - 4.0, epsilon = 1e-9);
    assert!(builder.diagnostics().is_clean());
}

#[test]
fn derive_is_idempotent() {
    let proportions = reference();
    let mut builder = derived(&proportions);
    let segments = builder.segments().to_vec();
    let slots = builder.slots().to_vec();

    builder.derive_from_proportions(&proportions).unwrap();

    assert_eq!(builder.segments(), segments.as_slice());
    assert_eq!(builder.slots(), slots.as_slice());
}

#[test]
fn overlong_slots_are_clipped() {
    let mut proportions = reference();
    proportions.set_total_length(115.0).unwrap();
    let builder = derived(&proportions);

    let adjustments = &builder.diagnostics().slot_adjustments;
    assert_eq!(adjustments.len(), 2);
    assert_relative_eq!(adjustments[0].clipped_length, 5.0, epsilon = 1e-9);
    assert_relative_eq!(adjustments[1].clipped_length, 21.5, epsilon = 1e-9);

    for (slot, host) in builder.slots().iter().zip([3, 9]) {
        assert!(slot.length() >= 0.0);
        assert_relative_eq!(slot.z_end(), builder.segments()[host].z_end(), epsilon = 1e-9);
    }
}

#[test]
fn slot_starting_past_its_host_is_skipped_at_build() {
    let mut proportions = reference();
    proportions.set_total_length(30.0).unwrap();
    let mut builder = derived(&proportions);
    assert!(builder.slots().iter().all(|s| s.length() == 0.0));

    let mut kernel = MockKernel::new();
    builder.build(&mut kernel).unwrap();

    assert_eq!(builder.diagnostics().skipped_slots, vec![0, 1]);
    assert_eq!(kernel.count_ops(|op| *op == MockOp::Subtract), 0);
}

#[test]
fn too_deep_slot_fails_before_any_geometry() {
    let proportions =
        ShaftProportions::new(230.0, 46.0, 8.0, ProportionLimits::unbounded()).unwrap();
    let mut builder = ShaftBuilder::default();
    let err = builder.derive_from_proportions(&proportions).unwrap_err();
    assert!(matches!(err, OpError::InvalidParameter { .. }));
    // The first keyway was fine, but nothing is kept from a failed derive
    assert!(builder.segments().is_empty());
    assert!(builder.slots().is_empty());

    let mut kernel = MockKernel::new();
    assert!(matches!(builder.build(&mut kernel), Err(OpError::NoSegments)));
    assert!(kernel.operations().is_empty());
}

#[test]
fn failed_derive_keeps_the_previous_model() {
    let mut builder = derived(&reference());
    let mut kernel = MockKernel::new();
    let solid = builder.build(&mut kernel).unwrap();
    let segments = builder.segments().to_vec();
    let slots = builder.slots().to_vec();

    let bad = ShaftProportions::new(230.0, 46.0, 8.0, ProportionLimits::unbounded()).unwrap();
    assert!(builder.derive_from_proportions(&bad).is_err());

    assert_eq!(builder.segments(), segments.as_slice());
    assert_eq!(builder.slots(), slots.as_slice());
    assert_eq!(builder.slots().len(), 2);
    assert_eq!(builder.final_solid(), Some(&solid));
    assert_relative_eq!(builder.settings().chamfer_length, 0.025, epsilon = 1e-12);
}

// ── Build pipeline ─────────────────────────────────────────────────────────

#[test]
fn build_sequences_fuse_chamfer_cut() {
    let mut builder = derived(&reference());
    let mut kernel = MockKernel::new();
    let solid = builder.build(&mut kernel).unwrap();

    assert_eq!(builder.final_solid(), Some(&solid));
    assert!(builder.diagnostics().is_clean());

    // 12 segment fuses + 2 per slot tool
    assert_eq!(kernel.count_ops(|op| *op == MockOp::Union), 16);
    assert_eq!(kernel.count_ops(is_chamfer), 2);
    assert_eq!(kernel.count_ops(|op| *op == MockOp::Subtract), 2);
    assert_eq!(kernel.count_ops(|op| matches!(op, MockOp::Cone { .. })), 1);

    let ops = kernel.operations();
    let last_chamfer = ops.iter().rposition(is_chamfer).unwrap();
    let first_cut = ops.iter().position(|op| *op == MockOp::Subtract).unwrap();
    assert!(last_chamfer < first_cut, "chamfers come before slot cuts");
}

#[test]
fn chamfer_uses_length_times_tan_angle() {
    let mut builder = ShaftBuilder::new(BuilderSettings {
        chamfer_angle_deg: 30.0,
        ..BuilderSettings::default()
    });
    builder.derive_from_proportions(&reference()).unwrap();
    let mut kernel = MockKernel::new();
    builder.build(&mut kernel).unwrap();

    let expected = 0.025 * 30f64.to_radians().tan();
    for op in kernel.operations().iter().filter(|op| is_chamfer(op)) {
        let MockOp::Chamfer {
            edges,
            distance1,
            distance2,
        } = op
        else {
            unreachable!()
        };
        assert_eq!(edges.len(), 1);
        assert_relative_eq!(*distance1, expected, epsilon = 1e-12);
        assert_relative_eq!(*distance2, expected, epsilon = 1e-12);
    }
}

#[test]
fn edge_choice_is_deterministic() {
    let proportions = reference();
    let mut logs = Vec::new();
    for _ in 0..2 {
        let mut builder = derived(&proportions);
        let mut kernel = MockKernel::new();
        builder.build(&mut kernel).unwrap();
        logs.push(kernel.operations().to_vec());
    }
    assert_eq!(logs[0], logs[1]);
}

#[test]
fn fuse_failure_aborts_build() {
    let mut builder = derived(&reference());
    let mut kernel = MockKernel::new();
    kernel.fail_union_call(4);

    let err = builder.build(&mut kernel).unwrap_err();
    match err {
        OpError::SegmentFuseFailed { index, source } => {
            assert_eq!(index, 5);
            assert!(matches!(source, KernelError::BooleanFailed { .. }));
        }
        other => panic!("expected fuse failure, got {other:?}"),
    }
    assert!(builder.final_solid().is_none());
    assert_eq!(kernel.count_ops(is_chamfer), 0);
}

#[test]
fn chamfer_failure_is_recoverable() {
    let mut builder = derived(&reference());
    let mut kernel = MockKernel::new();
    kernel.fail_chamfers();

    builder.build(&mut kernel).unwrap();
    let failed: Vec<ShaftEnd> = builder
        .diagnostics()
        .failed_chamfers
        .iter()
        .map(|f| f.end)
        .collect();
    assert_eq!(failed, vec![ShaftEnd::Start, ShaftEnd::End]);
    assert_eq!(kernel.count_ops(|op| *op == MockOp::Subtract), 2);

    // A second build reports the same failures, not twice as many
    builder.build(&mut kernel).unwrap();
    assert_eq!(builder.diagnostics().failed_chamfers.len(), 2);
}

#[test]
fn cut_failure_skips_only_that_slot() {
    let mut builder = derived(&reference());
    let mut kernel = MockKernel::new();
    kernel.fail_subtract_call(0);

    builder.build(&mut kernel).unwrap();
    let failed = &builder.diagnostics().failed_cuts;
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].slot, 0);
    assert_eq!(kernel.count_ops(|op| *op == MockOp::Subtract), 2);
}

#[test]
fn slot_tool_failure_is_fatal() {
    let mut builder = derived(&reference());
    let mut kernel = MockKernel::new();
    kernel.fail_union_call(12);

    let err = builder.build(&mut kernel).unwrap_err();
    assert!(matches!(err, OpError::SlotConstruction { index: 0, .. }));
    assert!(builder.final_solid().is_none());
}

#[test]
fn empty_builder_has_nothing_to_build() {
    let mut builder = ShaftBuilder::default();
    let mut kernel = MockKernel::new();
    assert!(matches!(
        builder.build(&mut kernel),
        Err(OpError::NoSegments)
    ));
    assert!(kernel.operations().is_empty());
}

#[test]
fn scripted_shaft_builds_and_exports() {
    let mut builder = ShaftBuilder::default();
    builder.add_cylinder(20.0, 20.0, None).unwrap();
    builder.add_cone(5.0, 20.0, 30.0, None).unwrap();
    builder.add_cylinder(30.0, 30.0, None).unwrap();
    builder.reduce_cylinder_diameter(0, 0.3).unwrap();
    builder.add_slot(6.0, 3.0, 12.0, 32.0, 15.0).unwrap();
    assert!(builder.add_slot(6.0, 16.0, 12.0, 32.0, 15.0).is_err());

    let mut kernel = MockKernel::new();
    builder.build(&mut kernel).unwrap();
    let step = builder.export_step(&kernel, "scripted.step").unwrap();
    assert!(step.starts_with("ISO-10303-21;"));
    assert!(step.contains("scripted.step"));
}

#[test]
fn export_failure_surfaces_as_kernel_error() {
    let mut builder = derived(&reference());
    let mut kernel = MockKernel::new();
    builder.build(&mut kernel).unwrap();
    kernel.fail_exports();

    assert!(matches!(
        builder.export_step(&kernel, "shaft.step"),
        Err(OpError::Kernel(KernelError::ExportFailed { .. }))
    ));
}

#[test]
fn settings_round_trip_with_defaults() {
    let settings: BuilderSettings =
        serde_json::from_str(r#"{"chamfer_angle_deg": 60.0}"#).unwrap();
    assert_eq!(settings.chamfer_angle_deg, 60.0);
    assert_eq!(settings.reduction_tolerance, 0.3);
}

//! The reference shaft on the truck backend.

use approx::assert_abs_diff_eq;

use geom_kernel::{KernelIntrospect, KernelSolidHandle, TruckKernel};
use shaft_ops::{BuilderSettings, ShaftBuilder};
use shaft_proportions::{ProportionLimits, ShaftProportions};

fn reference_builder() -> ShaftBuilder {
    let proportions =
        ShaftProportions::new(230.0, 23.0, 27.0, ProportionLimits::default()).unwrap();
    let mut builder = ShaftBuilder::new(BuilderSettings::default());
    builder.derive_from_proportions(&proportions).unwrap();
    builder
}

fn vertex_positions(kernel: &TruckKernel, solid: &KernelSolidHandle) -> Vec<[f64; 3]> {
    kernel
        .list_edges(solid)
        .into_iter()
        .filter_map(|edge| kernel.edge_vertices(edge))
        .flat_map(|(a, b)| [a, b])
        .filter_map(|v| kernel.vertex_position(v))
        .collect()
}

#[test]
fn segments_fuse_into_one_chamfered_shaft() {
    let mut builder = reference_builder();
    let mut kernel = TruckKernel::new();
    let solid = builder.build(&mut kernel).unwrap();

    let diagnostics = builder.diagnostics();
    assert!(diagnostics.missing_chamfer_edges.is_empty());
    assert!(diagnostics.failed_chamfers.is_empty());

    let positions = vertex_positions(&kernel, &solid);
    assert!(!positions.is_empty());
    let z_min = positions.iter().map(|p| p[2]).fold(f64::MAX, f64::min);
    let z_max = positions.iter().map(|p| p[2]).fold(f64::MIN, f64::max);
    assert_abs_diff_eq!(z_min, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(z_max, builder.length(), epsilon = 1e-9);

    // The start rim sits one chamfer depth inside the Ø23 seat
    let distance = builder.settings().chamfer_distance();
    let rim = 11.5 - distance;
    assert!(positions.iter().any(|p| {
        p[2].abs() < 1e-9 && ((p[0] * p[0] + p[1] * p[1]).sqrt() - rim).abs() < 1e-9
    }));
}

#[test]
fn built_shaft_exports_step_text() {
    let mut builder = reference_builder();
    let mut kernel = TruckKernel::new();
    builder.build(&mut kernel).unwrap();

    let step = builder.export_step(&kernel, "shaft.step").unwrap();
    assert!(step.contains("ISO-10303-21"));
    assert!(step.contains("shaft.step"));
}

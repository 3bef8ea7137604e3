//! Solid builders on top of truck's sweep API.
//!
//! truck has no built-in box/cylinder/cone, so everything is successive sweeps.
//! Axis directions passed in here are expected to be normalized already.

use std::f64::consts::PI;
use truck_modeling::builder;
use truck_modeling::topology::{Edge, Solid, Vertex, Wire};
use truck_modeling::{Point3, Rad, Vector3};

use crate::types::{perpendicular, KernelError};

fn point(p: [f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

fn vector(v: [f64; 3]) -> Vector3 {
    Vector3::new(v[0], v[1], v[2])
}

/// Box via successive translational sweeps, one corner at `origin`.
pub fn make_box(origin: [f64; 3], dx: f64, dy: f64, dz: f64) -> Solid {
    let v = builder::vertex(point(origin));
    let edge = builder::tsweep(&v, Vector3::new(dx, 0.0, 0.0));
    let face = builder::tsweep(&edge, Vector3::new(0.0, dy, 0.0));
    builder::tsweep(&face, Vector3::new(0.0, 0.0, dz))
}

/// Cylinder: circle wire around the axis → disc → translational sweep.
pub fn make_cylinder(
    origin: [f64; 3],
    axis: [f64; 3],
    radius: f64,
    length: f64,
) -> Result<Solid, KernelError> {
    let base = point(origin);
    let dir = vector(axis);
    let rim = base + vector(perpendicular(axis)) * radius;

    let v = builder::vertex(rim);
    let wire = builder::rsweep(&v, base, dir, Rad(2.0 * PI));
    let face = builder::try_attach_plane(&[wire]).map_err(|e| KernelError::InvalidPrimitive {
        reason: format!("failed to create circular face: {}", e),
    })?;
    Ok(builder::tsweep(&face, dir * length))
}

/// Truncated cone: half-section trapezoid touching the axis, revolved 2π.
/// One of the radii may be zero, giving a triangle section.
pub fn make_cone(
    origin: [f64; 3],
    axis: [f64; 3],
    radius_start: f64,
    radius_end: f64,
    length: f64,
) -> Result<Solid, KernelError> {
    make_revolved(origin, axis, &[(0.0, radius_start), (length, radius_end)])
}

/// Solid of revolution from a radius profile: `(offset, radius)` stations
/// along `axis`, closed through the axis at both ends and revolved 2π.
///
/// The section runs down the axis first and back along the profile, so its
/// plane normal points the way the revolve sweeps.
pub fn make_revolved(
    origin: [f64; 3],
    axis: [f64; 3],
    stations: &[(f64, f64)],
) -> Result<Solid, KernelError> {
    let (Some(&(t_first, _)), Some(&(t_last, _))) = (stations.first(), stations.last()) else {
        return Err(KernelError::InvalidPrimitive {
            reason: "revolve profile has no stations".to_string(),
        });
    };
    let base = point(origin);
    let dir = vector(axis);
    let radial = vector(perpendicular(axis));
    let at = |t: f64, r: f64| base + dir * t + radial * r;

    let mut corners = vec![at(t_first, 0.0), at(t_last, 0.0)];
    for &(t, r) in stations.iter().rev().filter(|s| s.1 > 0.0) {
        let p = at(t, r);
        if corners.last().is_some_and(|&q| q == p) {
            continue;
        }
        corners.push(p);
    }
    if corners.len() < 3 || corners[0] == corners[1] {
        return Err(KernelError::InvalidPrimitive {
            reason: "revolve section collapses onto its axis".to_string(),
        });
    }

    let vertices: Vec<Vertex> = corners.iter().map(|&p| builder::vertex(p)).collect();
    let n = vertices.len();
    let edges: Vec<Edge> = (0..n)
        .map(|i| builder::line(&vertices[i], &vertices[(i + 1) % n]))
        .collect();
    let section = Wire::from_iter(edges);

    let face = builder::try_attach_plane(&[section]).map_err(|e| KernelError::InvalidPrimitive {
        reason: format!("failed to create revolve section: {}", e),
    })?;
    Ok(builder::rsweep(&face, base, dir, Rad(2.0 * PI)))
}

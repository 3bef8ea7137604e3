//! KernelIntrospect for TruckKernel.
//!
//! truck entity ids are not stable integers, so edges and vertices are
//! addressed positionally: `handle * 10000 + 1000 + idx` for the idx-th
//! distinct edge of a solid and `handle * 10000 + 2000 + idx` for vertices.
//! Each range holds 1000 ids; entities past that are not addressable.

use std::collections::HashSet;

use crate::traits::KernelIntrospect;
use crate::truck_kernel::TruckKernel;
use crate::types::*;

use tracing::warn;
use truck_modeling::topology::{Edge, Solid, Vertex};

const EDGE_BASE: u64 = 1000;
const VERTEX_BASE: u64 = 2000;
const RANGE_SIZE: u64 = 1000;
const HANDLE_STRIDE: u64 = 10000;

/// Positional id of the `idx`-th entity in the range starting at `base`.
fn encode(handle: &KernelSolidHandle, base: u64, idx: usize) -> Option<KernelId> {
    let idx = idx as u64;
    (idx < RANGE_SIZE).then(|| KernelId(handle.id() * HANDLE_STRIDE + base + idx))
}

impl TruckKernel {
    /// Owning solid and end point positions of an edge.
    pub(crate) fn edge_endpoints(
        &self,
        edge: KernelId,
    ) -> Option<(KernelSolidHandle, [f64; 3], [f64; 3])> {
        let (handle, offset) = decode(edge, EDGE_BASE)?;
        let truck_solid = self.get_solid(&handle)?;
        let target = distinct_edges(truck_solid).get(offset)?.clone();
        let (a, b) = (target.front().point(), target.back().point());
        Some((handle, [a[0], a[1], a[2]], [b[0], b[1], b[2]]))
    }
}

impl KernelIntrospect for TruckKernel {
    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        let Some(truck_solid) = self.get_solid(solid) else {
            return Vec::new();
        };
        let count = distinct_edges(truck_solid).len();
        if count as u64 > RANGE_SIZE {
            warn!(count, listed = RANGE_SIZE, "solid has more edges than can be addressed");
        }
        (0..count)
            .map_while(|idx| encode(solid, EDGE_BASE, idx))
            .collect()
    }

    fn edge_vertices(&self, edge: KernelId) -> Option<(KernelId, KernelId)> {
        let (handle, offset) = decode(edge, EDGE_BASE)?;
        let truck_solid = self.get_solid(&handle)?;

        let edges = distinct_edges(truck_solid);
        let target = edges.get(offset)?;
        let vertices = distinct_vertices(truck_solid);

        let index_of = |v: &Vertex| {
            let i = vertices.iter().position(|w| w.id() == v.id())?;
            encode(&handle, VERTEX_BASE, i)
        };
        Some((index_of(target.front())?, index_of(target.back())?))
    }

    fn vertex_position(&self, vertex: KernelId) -> Option<[f64; 3]> {
        let (handle, offset) = decode(vertex, VERTEX_BASE)?;
        let truck_solid = self.get_solid(&handle)?;
        let p = distinct_vertices(truck_solid).get(offset)?.point();
        Some([p[0], p[1], p[2]])
    }
}

fn decode(id: KernelId, base: u64) -> Option<(KernelSolidHandle, usize)> {
    let local = id.0 % HANDLE_STRIDE;
    if !(base..base + RANGE_SIZE).contains(&local) {
        return None;
    }
    Some((KernelSolidHandle(id.0 / HANDLE_STRIDE), (local - base) as usize))
}

fn distinct_edges(solid: &Solid) -> Vec<Edge> {
    let mut seen = HashSet::new();
    solid
        .boundaries()
        .iter()
        .flat_map(|shell| shell.edge_iter())
        .filter(|e| seen.insert(e.id()))
        .collect()
}

fn distinct_vertices(solid: &Solid) -> Vec<Vertex> {
    let mut seen = HashSet::new();
    solid
        .boundaries()
        .iter()
        .flat_map(|shell| shell.vertex_iter())
        .filter(|v| seen.insert(v.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Kernel;

    #[test]
    fn box_edges_resolve_to_corner_positions() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box([0.0; 3], 2.0, 3.0, 4.0).unwrap();

        let edges = kernel.list_edges(&handle);
        assert_eq!(edges.len(), 12);

        for edge in edges {
            let (a, b) = kernel.edge_vertices(edge).unwrap();
            assert_ne!(a, b, "box edges are open segments");
            let pa = kernel.vertex_position(a).unwrap();
            let pb = kernel.vertex_position(b).unwrap();
            let differing = (0..3).filter(|&i| (pa[i] - pb[i]).abs() > 1e-9).count();
            assert_eq!(differing, 1, "box edges are axis-aligned");
        }
    }

    #[test]
    fn ids_stay_inside_their_range() {
        let handle = KernelSolidHandle(7);
        assert_eq!(encode(&handle, EDGE_BASE, 0), Some(KernelId(71_000)));
        assert_eq!(encode(&handle, EDGE_BASE, 999), Some(KernelId(71_999)));
        // The 1000th edge would collide with the first vertex id
        assert_eq!(encode(&handle, EDGE_BASE, 1000), None);
        assert_eq!(encode(&handle, VERTEX_BASE, 1000), None);

        let first_vertex = encode(&handle, VERTEX_BASE, 0).unwrap();
        assert!(decode(first_vertex, EDGE_BASE).is_none());
        assert_eq!(decode(first_vertex, VERTEX_BASE), Some((handle, 0)));
    }

    #[test]
    fn edge_endpoints_match_introspection() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box([0.0; 3], 2.0, 3.0, 4.0).unwrap();
        let edge = kernel.list_edges(&handle)[0];

        let (owner, a, b) = kernel.edge_endpoints(edge).unwrap();
        let (va, vb) = kernel.edge_vertices(edge).unwrap();
        assert_eq!(owner, handle);
        assert_eq!(Some(a), kernel.vertex_position(va));
        assert_eq!(Some(b), kernel.vertex_position(vb));
    }

    #[test]
    fn unknown_ids_resolve_to_none() {
        let kernel = TruckKernel::new();
        assert!(kernel.edge_vertices(KernelId(10_001_000)).is_none());
        assert!(kernel.vertex_position(KernelId(5)).is_none());
        assert!(kernel.list_edges(&KernelSolidHandle(3)).is_empty());
    }
}

use geom_kernel::{KernelId, KernelIntrospect, KernelSolidHandle};

/// Pick the edge to chamfer at the end plane `z = plane_z`.
///
/// Every edge with an endpoint within `tolerance` of the plane is a
/// candidate. Edges with more endpoints on the plane rank first (a closed
/// rim counts its vertex twice), then the lowest kernel id.
pub fn find_end_edge(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    plane_z: f64,
    tolerance: f64,
) -> Option<KernelId> {
    let on_plane = |vertex: KernelId| {
        introspect
            .vertex_position(vertex)
            .is_some_and(|p| (p[2] - plane_z).abs() < tolerance)
    };

    introspect
        .list_edges(solid)
        .into_iter()
        .filter_map(|edge| {
            let (a, b) = introspect.edge_vertices(edge)?;
            let hits = on_plane(a) as usize + on_plane(b) as usize;
            (hits > 0).then_some((hits, edge))
        })
        .min_by(|(hits_a, id_a), (hits_b, id_b)| hits_b.cmp(hits_a).then(id_a.cmp(id_b)))
        .map(|(_, edge)| edge)
}

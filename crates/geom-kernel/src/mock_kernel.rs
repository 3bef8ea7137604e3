//! MockKernel: deterministic test double implementing Kernel + KernelIntrospect.
//!
//! Produces synthetic topology with predictable entity counts and positions,
//! records every operation it is asked to perform, and can be told to fail
//! specific calls. Used by shaft-ops, shaft-format and shaft-app for testing.

use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;
use std::collections::{HashMap, HashSet};

/// A mock vertex with known position.
#[derive(Debug, Clone)]
struct MockVertex {
    id: KernelId,
    position: [f64; 3],
}

/// A mock edge with known endpoints. Closed edges (circles) start and end on
/// the same vertex.
#[derive(Debug, Clone)]
struct MockEdge {
    id: KernelId,
    start: KernelId,
    end: KernelId,
}

/// A mock face: bounding edges plus a surface classification.
#[derive(Debug, Clone)]
struct MockFace {
    id: KernelId,
    edges: Vec<KernelId>,
    surface_type: &'static str,
}

#[derive(Debug, Clone, Default)]
struct MockSolid {
    vertices: Vec<MockVertex>,
    edges: Vec<MockEdge>,
    faces: Vec<MockFace>,
}

/// One recorded kernel call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOp {
    Cylinder {
        origin: [f64; 3],
        radius: f64,
        length: f64,
    },
    Cone {
        origin: [f64; 3],
        radius_start: f64,
        radius_end: f64,
        length: f64,
    },
    Box {
        origin: [f64; 3],
        size: [f64; 3],
    },
    Union,
    Subtract,
    Chamfer {
        edges: Vec<KernelId>,
        distance1: f64,
        distance2: f64,
    },
    Export {
        file_name: String,
    },
}

/// Vertex, edge and face counts of a mock solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyCounts {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
}

/// Deterministic test double for the geometry kernel.
pub struct MockKernel {
    next_id: u64,
    next_handle: u64,
    solids: HashMap<u64, MockSolid>,
    log: Vec<MockOp>,
    union_calls: usize,
    subtract_calls: usize,
    failing_unions: HashSet<usize>,
    failing_subtracts: HashSet<usize>,
    fail_chamfer: bool,
    fail_export: bool,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            next_handle: 1,
            solids: HashMap::new(),
            log: Vec::new(),
            union_calls: 0,
            subtract_calls: 0,
            failing_unions: HashSet::new(),
            failing_subtracts: HashSet::new(),
            fail_chamfer: false,
            fail_export: false,
        }
    }

    /// Make the n-th call (0-based) to `boolean_union` fail.
    pub fn fail_union_call(&mut self, call: usize) -> &mut Self {
        self.failing_unions.insert(call);
        self
    }

    /// Make the n-th call (0-based) to `boolean_subtract` fail.
    pub fn fail_subtract_call(&mut self, call: usize) -> &mut Self {
        self.failing_subtracts.insert(call);
        self
    }

    /// Make every `chamfer_edges` call fail.
    pub fn fail_chamfers(&mut self) -> &mut Self {
        self.fail_chamfer = true;
        self
    }

    /// Make every `export_step` call fail.
    pub fn fail_exports(&mut self) -> &mut Self {
        self.fail_export = true;
        self
    }

    /// Every operation requested so far, in call order (including failed ones).
    pub fn operations(&self) -> &[MockOp] {
        &self.log
    }

    pub fn count_ops(&self, pred: impl Fn(&MockOp) -> bool) -> usize {
        self.log.iter().filter(|op| pred(op)).count()
    }

    pub fn topology_counts(&self, solid: &KernelSolidHandle) -> Option<TopologyCounts> {
        self.solids.get(&solid.id()).map(|s| TopologyCounts {
            vertices: s.vertices.len(),
            edges: s.edges.len(),
            faces: s.faces.len(),
        })
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn store(&mut self, solid: MockSolid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn get(&self, handle: &KernelSolidHandle) -> Result<&MockSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }

    /// Solid of revolution with OCC-like topology: 2 vertices on the seam,
    /// 2 circular edges, 1 seam edge, 3 faces.
    fn revolved_solid(
        &mut self,
        origin: [f64; 3],
        axis: [f64; 3],
        radius_start: f64,
        radius_end: f64,
        length: f64,
        lateral: &'static str,
    ) -> MockSolid {
        let p = perpendicular(axis);
        let bottom = [
            origin[0] + p[0] * radius_start,
            origin[1] + p[1] * radius_start,
            origin[2] + p[2] * radius_start,
        ];
        let top = [
            origin[0] + axis[0] * length + p[0] * radius_end,
            origin[1] + axis[1] * length + p[1] * radius_end,
            origin[2] + axis[2] * length + p[2] * radius_end,
        ];

        let v0 = MockVertex {
            id: self.alloc_id(),
            position: bottom,
        };
        let v1 = MockVertex {
            id: self.alloc_id(),
            position: top,
        };

        let bottom_circle = MockEdge {
            id: self.alloc_id(),
            start: v0.id,
            end: v0.id,
        };
        let top_circle = MockEdge {
            id: self.alloc_id(),
            start: v1.id,
            end: v1.id,
        };
        let seam = MockEdge {
            id: self.alloc_id(),
            start: v0.id,
            end: v1.id,
        };

        let faces = vec![
            MockFace {
                id: self.alloc_id(),
                edges: vec![bottom_circle.id],
                surface_type: "planar",
            },
            MockFace {
                id: self.alloc_id(),
                edges: vec![top_circle.id],
                surface_type: "planar",
            },
            MockFace {
                id: self.alloc_id(),
                edges: vec![bottom_circle.id, top_circle.id, seam.id],
                surface_type: lateral,
            },
        ];

        MockSolid {
            vertices: vec![v0, v1],
            edges: vec![bottom_circle, top_circle, seam],
            faces,
        }
    }

    /// Box solid with 8 vertices, 12 edges, 6 faces.
    fn box_solid(&mut self, origin: [f64; 3], dx: f64, dy: f64, dz: f64) -> MockSolid {
        let [x, y, z] = origin;
        let positions = [
            [x, y, z],
            [x + dx, y, z],
            [x + dx, y + dy, z],
            [x, y + dy, z],
            [x, y, z + dz],
            [x + dx, y, z + dz],
            [x + dx, y + dy, z + dz],
            [x, y + dy, z + dz],
        ];

        let verts: Vec<MockVertex> = positions
            .iter()
            .map(|&position| MockVertex {
                id: self.alloc_id(),
                position,
            })
            .collect();

        // 4 at z, 4 at z + dz, 4 along z
        let edge_pairs = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        let edges: Vec<MockEdge> = edge_pairs
            .iter()
            .map(|&(s, e)| MockEdge {
                id: self.alloc_id(),
                start: verts[s].id,
                end: verts[e].id,
            })
            .collect();

        let face_edges: [[usize; 4]; 6] = [
            [0, 1, 2, 3],
            [4, 5, 6, 7],
            [0, 9, 4, 8],
            [2, 11, 6, 10],
            [3, 8, 7, 11],
            [1, 10, 5, 9],
        ];
        let faces: Vec<MockFace> = face_edges
            .iter()
            .map(|idx| MockFace {
                id: self.alloc_id(),
                edges: idx.iter().map(|&i| edges[i].id).collect(),
                surface_type: "planar",
            })
            .collect();

        MockSolid {
            vertices: verts,
            edges,
            faces,
        }
    }

    /// Copy topology of every input solid under fresh IDs, as a real kernel
    /// does for each boolean result.
    fn reidentify(&mut self, parts: &[&MockSolid]) -> (MockSolid, HashMap<KernelId, KernelId>) {
        let mut out = MockSolid::default();
        let mut id_map: HashMap<KernelId, KernelId> = HashMap::new();

        for part in parts {
            for v in &part.vertices {
                let new_id = self.alloc_id();
                id_map.insert(v.id, new_id);
                out.vertices.push(MockVertex {
                    id: new_id,
                    position: v.position,
                });
            }
            for e in &part.edges {
                let new_id = self.alloc_id();
                id_map.insert(e.id, new_id);
                out.edges.push(MockEdge {
                    id: new_id,
                    start: id_map[&e.start],
                    end: id_map[&e.end],
                });
            }
            for f in &part.faces {
                let new_id = self.alloc_id();
                id_map.insert(f.id, new_id);
                out.faces.push(MockFace {
                    id: new_id,
                    edges: f.edges.iter().map(|eid| id_map[eid]).collect(),
                    surface_type: f.surface_type,
                });
            }
        }

        (out, id_map)
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for MockKernel {
    fn make_cylinder(
        &mut self,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        radius: f64,
        length: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.log.push(MockOp::Cylinder {
            origin: axis_origin,
            radius,
            length,
        });
        let axis = normalized_axis(axis_direction)?;
        require_positive("cylinder radius", radius)?;
        require_positive("cylinder length", length)?;

        let solid = self.revolved_solid(axis_origin, axis, radius, radius, length, "cylindrical");
        Ok(self.store(solid))
    }

    fn make_cone(
        &mut self,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        radius_start: f64,
        radius_end: f64,
        length: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.log.push(MockOp::Cone {
            origin: axis_origin,
            radius_start,
            radius_end,
            length,
        });
        let axis = normalized_axis(axis_direction)?;
        require_positive("cone length", length)?;
        if radius_start < 0.0 || radius_end < 0.0 || radius_start.max(radius_end) <= 0.0 {
            return Err(KernelError::InvalidPrimitive {
                reason: format!("invalid cone radii {radius_start} -> {radius_end}"),
            });
        }

        let solid =
            self.revolved_solid(axis_origin, axis, radius_start, radius_end, length, "conical");
        Ok(self.store(solid))
    }

    fn make_box(
        &mut self,
        origin: [f64; 3],
        dx: f64,
        dy: f64,
        dz: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.log.push(MockOp::Box {
            origin,
            size: [dx, dy, dz],
        });
        require_positive("box width", dx)?;
        require_positive("box height", dy)?;
        require_positive("box depth", dz)?;

        let solid = self.box_solid(origin, dx, dy, dz);
        Ok(self.store(solid))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.log.push(MockOp::Union);
        let call = self.union_calls;
        self.union_calls += 1;

        let solid_a = self.get(a)?.clone();
        let solid_b = self.get(b)?.clone();
        if self.failing_unions.contains(&call) {
            return Err(KernelError::BooleanFailed {
                reason: format!("mock union call {call} configured to fail"),
            });
        }

        let (merged, _) = self.reidentify(&[&solid_a, &solid_b]);
        Ok(self.store(merged))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.log.push(MockOp::Subtract);
        let call = self.subtract_calls;
        self.subtract_calls += 1;

        let solid_a = self.get(a)?.clone();
        self.get(b)?;
        if self.failing_subtracts.contains(&call) {
            return Err(KernelError::BooleanFailed {
                reason: format!("mock subtract call {call} configured to fail"),
            });
        }

        // The tool body leaves no trace in the synthetic topology
        let (result, _) = self.reidentify(&[&solid_a]);
        Ok(self.store(result))
    }

    fn chamfer_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        distance1: f64,
        distance2: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.log.push(MockOp::Chamfer {
            edges: edges.to_vec(),
            distance1,
            distance2,
        });
        if self.fail_chamfer {
            return Err(KernelError::ChamferFailed {
                reason: "mock chamfer configured to fail".to_string(),
            });
        }
        if distance1 <= 0.0 || distance2 <= 0.0 {
            return Err(KernelError::ChamferFailed {
                reason: "chamfer distances must be positive".to_string(),
            });
        }

        let source = self.get(solid)?.clone();
        for eid in edges {
            if !source.edges.iter().any(|e| e.id == *eid) {
                return Err(KernelError::ChamferFailed {
                    reason: format!("edge {:?} not found in solid", eid),
                });
            }
        }

        let chamfered: HashSet<KernelId> = edges.iter().copied().collect();
        let (mut result, id_map) = self.reidentify(&[&source]);
        let dropped: HashSet<KernelId> = chamfered.iter().map(|e| id_map[e]).collect();
        result.edges.retain(|e| !dropped.contains(&e.id));
        for face in &mut result.faces {
            face.edges.retain(|e| !dropped.contains(e));
        }

        // Bevel geometry is pulled towards the middle of the solid along z
        let z_mid = source.vertices.iter().map(|v| v.position[2]).sum::<f64>()
            / source.vertices.len().max(1) as f64;

        for eid in edges {
            let Some(orig) = source.edges.iter().find(|e| e.id == *eid) else {
                continue;
            };
            let mut boundary = Vec::new();
            for end in [orig.start, orig.end] {
                let Some(v) = source.vertices.iter().find(|v| v.id == end) else {
                    continue;
                };
                let mut position = v.position;
                position[2] += (z_mid - position[2]).signum() * distance1;
                let moved = MockVertex {
                    id: self.alloc_id(),
                    position,
                };
                let edge = MockEdge {
                    id: self.alloc_id(),
                    start: id_map[&end],
                    end: moved.id,
                };
                boundary.push(edge.id);
                result.vertices.push(moved);
                result.edges.push(edge);
            }
            let face = MockFace {
                id: self.alloc_id(),
                edges: boundary,
                surface_type: "conical",
            };
            result.faces.push(face);
        }

        Ok(self.store(result))
    }

    fn export_step(
        &self,
        solid: &KernelSolidHandle,
        file_name: &str,
    ) -> Result<String, KernelError> {
        let s = self.get(solid)?;
        if self.fail_export {
            return Err(KernelError::ExportFailed {
                reason: "mock export configured to fail".to_string(),
            });
        }
        Ok(format!(
            "ISO-10303-21;\nHEADER;\nFILE_NAME('{}');\nENDSEC;\nDATA;\n/* mock solid: {} vertices, {} edges, {} faces */\nENDSEC;\nEND-ISO-10303-21;\n",
            file_name,
            s.vertices.len(),
            s.edges.len(),
            s.faces.len()
        ))
    }
}

impl KernelIntrospect for MockKernel {
    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.solids
            .get(&solid.id())
            .map(|s| s.edges.iter().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    fn edge_vertices(&self, edge: KernelId) -> Option<(KernelId, KernelId)> {
        self.solids
            .values()
            .flat_map(|s| s.edges.iter())
            .find(|e| e.id == edge)
            .map(|e| (e.start, e.end))
    }

    fn vertex_position(&self, vertex: KernelId) -> Option<[f64; 3]> {
        self.solids
            .values()
            .flat_map(|s| s.vertices.iter())
            .find(|v| v.id == vertex)
            .map(|v| v.position)
    }
}

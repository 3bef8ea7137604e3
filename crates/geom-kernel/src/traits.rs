use crate::types::*;

/// Solid construction and modification operations of the geometry engine.
/// Implemented by TruckKernel (real B-rep backend) and MockKernel (deterministic test double).
///
/// Every call blocks until the engine has produced a result; a failed
/// operation leaves all existing handles untouched.
pub trait Kernel {
    /// Solid cylinder whose base disc is centered at `axis_origin`, extruded
    /// `length` along `axis_direction`.
    fn make_cylinder(
        &mut self,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        radius: f64,
        length: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Truncated cone: `radius_start` at `axis_origin`, `radius_end` at
    /// `axis_origin + length * axis_direction`.
    fn make_cone(
        &mut self,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        radius_start: f64,
        radius_end: f64,
        length: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Axis-aligned box with one corner at `origin`, extending by (dx, dy, dz).
    fn make_box(
        &mut self,
        origin: [f64; 3],
        dx: f64,
        dy: f64,
        dz: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean union (fuse) of two solids.
    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean subtraction (cut): a minus b.
    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Bevel the given edges with two setback distances.
    fn chamfer_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        distance1: f64,
        distance2: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Transfer a solid into STEP (ISO 10303-21) text. Writing the text to
    /// disk is left to the caller.
    fn export_step(
        &self,
        solid: &KernelSolidHandle,
        file_name: &str,
    ) -> Result<String, KernelError>;
}

/// Read-only topology queries.
pub trait KernelIntrospect {
    /// All edges of a solid, in the engine's enumeration order.
    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<KernelId>;

    /// The two end vertices of an edge. Closed edges report the same vertex twice.
    fn edge_vertices(&self, edge: KernelId) -> Option<(KernelId, KernelId)>;

    /// Position of a vertex.
    fn vertex_position(&self, vertex: KernelId) -> Option<[f64; 3]>;
}

/// A kernel usable through a single `&mut` borrow for both construction and
/// introspection.
pub trait KernelBundle: Kernel + KernelIntrospect {
    fn as_introspect(&self) -> &dyn KernelIntrospect;
}

impl<T: Kernel + KernelIntrospect> KernelBundle for T {
    fn as_introspect(&self) -> &dyn KernelIntrospect {
        self
    }
}

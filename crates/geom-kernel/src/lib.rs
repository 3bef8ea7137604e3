//! Geometry engine boundary for the shaft builder.
//!
//! Everything above this crate talks to solids through opaque handles and
//! the [`Kernel`] / [`KernelIntrospect`] traits.

pub mod mock_kernel;
pub mod primitives;
mod revolved;
pub mod traits;
pub mod truck_introspect;
pub mod truck_kernel;
pub mod types;

pub use mock_kernel::{MockKernel, MockOp, TopologyCounts};
pub use traits::*;
pub use truck_kernel::TruckKernel;
pub use types::*;

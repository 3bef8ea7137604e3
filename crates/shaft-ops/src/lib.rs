//! Shaft assembly on top of the geometry kernel.

pub mod builder;
pub mod chamfer;
pub mod segment;
pub mod slot;
pub mod types;

pub use builder::ShaftBuilder;
pub use chamfer::find_end_edge;
pub use segment::{SegmentProfile, ShaftSegment};
pub use slot::Slot;
pub use types::*;

//! Proportional dimensioning of the stepped shaft family.
//!
//! Pure arithmetic: no geometry engine is involved here.

pub mod catalog;
pub mod error;
pub mod limits;
pub mod proportions;

pub use catalog::{SegmentKind, REFERENCE_BASE_DIAMETER, REFERENCE_SEGMENTS};
pub use error::ConfigError;
pub use limits::{Band, ProportionLimits};
pub use proportions::{SegmentInfo, ShaftProportions, SlotInfo};

/// Rejected proportion inputs. Returning one of these never changes the table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("segment index {index} out of range (catalog has {count} segments)")]
    SegmentIndexOutOfRange { index: usize, count: usize },

    #[error("slot index {index} out of range ({count} slots defined)")]
    SlotIndexOutOfRange { index: usize, count: usize },

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },

    #[error("{what} {value} outside admissible range ({lower}, {upper}]")]
    OutOfBand {
        what: &'static str,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error(
        "base diameter {base} implies a total length of {length}, outside admissible range ({lower}, {upper}]"
    )]
    DerivedLengthOutOfBand {
        base: f64,
        length: f64,
        lower: f64,
        upper: f64,
    },
}

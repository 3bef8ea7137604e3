use serde::{Deserialize, Serialize};

/// Opaque handle to a solid in the geometry kernel.
/// Valid only for the kernel instance that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelSolidHandle(pub(crate) u64);

impl KernelSolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Kernel-internal identifier of an edge or vertex.
/// Stable within a single kernel session but NOT across rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KernelId(pub u64);

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("invalid primitive: {reason}")]
    InvalidPrimitive { reason: String },

    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("chamfer failed: {reason}")]
    ChamferFailed { reason: String },

    #[error("STEP transfer failed: {reason}")]
    ExportFailed { reason: String },

    #[error("entity not found: {id:?}")]
    EntityNotFound { id: KernelId },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },
}

/// Check that an axis direction is usable and return it normalized.
pub(crate) fn normalized_axis(direction: [f64; 3]) -> Result<[f64; 3], KernelError> {
    let len = (direction[0] * direction[0] + direction[1] * direction[1] + direction[2] * direction[2])
        .sqrt();
    if len < 1e-12 {
        return Err(KernelError::InvalidPrimitive {
            reason: "axis direction has zero length".to_string(),
        });
    }
    Ok([direction[0] / len, direction[1] / len, direction[2] / len])
}

/// Unit vector perpendicular to `axis` (which must be normalized).
pub(crate) fn perpendicular(axis: [f64; 3]) -> [f64; 3] {
    // Pick a helper vector that is not parallel to the axis
    let helper = if axis[0].abs() < 0.9 {
        [1.0, 0.0, 0.0]
    } else {
        [0.0, 1.0, 0.0]
    };
    let p = [
        helper[1] * axis[2] - helper[2] * axis[1],
        helper[2] * axis[0] - helper[0] * axis[2],
        helper[0] * axis[1] - helper[1] * axis[0],
    ];
    let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
    [p[0] / len, p[1] / len, p[2] / len]
}

pub(crate) fn require_positive(name: &str, value: f64) -> Result<(), KernelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidPrimitive {
            reason: format!("{name} must be positive, got {value}"),
        })
    }
}

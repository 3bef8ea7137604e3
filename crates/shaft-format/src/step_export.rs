use std::path::Path;

use geom_kernel::KernelBundle;
use shaft_ops::{OpError, ShaftBuilder};
use tracing::{info, instrument};

use crate::errors::ExportError;

/// File written when no export path is given.
pub const DEFAULT_EXPORT_FILE: &str = "shaft_custom_dimensions.step";

/// Export the builder's final solid to a STEP file at `path`.
///
/// The transfer into STEP text and the write to disk fail separately, as
/// `TransferFailed` and `WriteFailed`.
#[instrument(skip(builder, kb))]
pub fn export_step(
    builder: &ShaftBuilder,
    kb: &dyn KernelBundle,
    path: &Path,
) -> Result<(), ExportError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_EXPORT_FILE);

    let text = builder.export_step(kb, file_name).map_err(|e| match e {
        OpError::NotBuilt => ExportError::NoSolid,
        other => ExportError::TransferFailed(other.to_string()),
    })?;

    std::fs::write(path, &text).map_err(|e| ExportError::WriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    info!(bytes = text.len(), "shaft exported");
    Ok(())
}

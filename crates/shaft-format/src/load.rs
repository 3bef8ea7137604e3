use serde::Deserialize;

use crate::design::ShaftDesign;
use crate::errors::LoadError;
use crate::metadata::DesignMetadata;
use crate::save::{FORMAT_ID, FORMAT_VERSION};

/// The top-level file structure for deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct DesignFileRaw {
    pub format: String,
    pub version: u32,
    pub metadata: DesignMetadata,
    pub design: ShaftDesign,
}

/// Deserialize a design from a JSON string.
///
/// Validates the format identifier and version. The design values
/// themselves are checked when they are turned into proportions.
pub fn load_design(json: &str) -> Result<(ShaftDesign, DesignMetadata), LoadError> {
    let raw: DesignFileRaw =
        serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))?;

    if raw.format != FORMAT_ID {
        return Err(LoadError::UnknownFormat(raw.format));
    }

    if raw.version > FORMAT_VERSION {
        return Err(LoadError::FutureVersion {
            file_version: raw.version,
            supported_version: FORMAT_VERSION,
        });
    }

    Ok((raw.design, raw.metadata))
}

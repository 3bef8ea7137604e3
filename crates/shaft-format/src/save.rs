use serde::Serialize;

use crate::design::ShaftDesign;
use crate::metadata::DesignMetadata;

/// Current file format version.
pub const FORMAT_VERSION: u32 = 1;

/// Format identifier written into every design file.
pub const FORMAT_ID: &str = "shaft-design";

/// The top-level file structure.
#[derive(Debug, Clone, Serialize)]
pub struct DesignFile<'a> {
    pub format: &'static str,
    pub version: u32,
    pub metadata: &'a DesignMetadata,
    pub design: &'a ShaftDesign,
}

/// Serialize a design to a pretty-printed JSON string.
pub fn save_design(design: &ShaftDesign, metadata: &DesignMetadata) -> String {
    let file = DesignFile {
        format: FORMAT_ID,
        version: FORMAT_VERSION,
        metadata,
        design,
    };
    serde_json::to_string_pretty(&file).expect("ShaftDesign serialization should never fail")
}

pub mod design;
pub mod errors;
pub mod load;
pub mod metadata;
pub mod save;
pub mod step_export;

pub use design::ShaftDesign;
pub use errors::{ExportError, LoadError};
pub use load::load_design;
pub use metadata::DesignMetadata;
pub use save::{save_design, FORMAT_VERSION};
pub use step_export::{export_step, DEFAULT_EXPORT_FILE};

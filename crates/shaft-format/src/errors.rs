/// Errors during design file loading.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("failed to parse file: {0}")]
    ParseError(String),

    #[error("unknown file format: {0}")]
    UnknownFormat(String),

    #[error("file version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },
}

/// Errors during STEP export.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("no solid available for export")]
    NoSolid,

    #[error("STEP transfer failed: {0}")]
    TransferFailed(String),

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

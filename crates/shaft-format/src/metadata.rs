use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Design metadata stored alongside the shaft parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignMetadata {
    /// Human-readable design name.
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl DesignMetadata {
    /// Create metadata with the given name and current timestamp.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            created: now,
            modified: now,
        }
    }

    /// Bump the modification time.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

//! Validation result types

use serde::{Deserialize, Serialize};

/// Non-blocking finding about a submitted config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigWarning {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ConfigWarning {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Result of semantic validation
///
/// Any error rejects the config; warnings are reported back but never block
/// a save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub errors: Vec<String>,
    pub warnings: Vec<ConfigWarning>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

//! # Core Error Types

use thiserror::Error;

/// Errors raised while turning configuration into entities.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A spawn referenced a preset name the registry does not know.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// A configuration record is structurally invalid.
    #[error("invalid entity configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for store operations.
pub type CoreResult<T> = Result<T, CoreError>;

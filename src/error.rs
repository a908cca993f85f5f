// File: src/error.rs
use thiserror::Error;

/// Errors raised while loading configuration or catalog data.
///
/// Problems found while analyzing a verse are never errors; they travel as
/// [`Diagnostic`](crate::core::types::Diagnostic) values next to the result.
#[derive(Debug, Error)]
pub enum ChandasError {
    /// Two templates in one catalog share a name.
    #[error("duplicate meter name in catalog: {name:?}")]
    DuplicateMeter { name: String },

    /// A template record could not be turned into quarters and constraints.
    #[error("malformed template for meter {meter:?}: {reason}")]
    MalformedTemplate { meter: String, reason: String },

    /// The catalog data declares a format version this build cannot read.
    #[error("unsupported catalog version {found} (expected {expected})")]
    UnsupportedCatalogVersion { found: u32, expected: u32 },

    /// Analyzer settings outside their valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("failed to persist catalog: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl ChandasError {
    /// True for the fatal load-time family: the process must not start
    /// analyzing with a catalog or config that produced one of these.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateMeter { .. }
                | Self::MalformedTemplate { .. }
                | Self::UnsupportedCatalogVersion { .. }
                | Self::InvalidConfig(_)
                | Self::Json(_)
                | Self::Snapshot(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ChandasError>;

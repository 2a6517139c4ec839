//! Error taxonomy for the MEET report core.

/// Boxed error coming from a [`crate::WorkItemSource`] implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A query against the work item source failed. The run must not print a
    /// partial report.
    #[error("{operation} failed: {source}")]
    Source {
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid portfolio item: {0}")]
    InvalidPortfolioItem(String),
}

impl CoreError {
    /// Wrap a source failure with a description of the failing operation.
    pub fn source(operation: impl Into<String>, source: impl Into<BoxError>) -> Self {
        CoreError::Source {
            operation: operation.into(),
            source: source.into(),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

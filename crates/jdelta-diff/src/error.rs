//! Error types for the diff crate.

/// Errors that can occur while configuring a diff.
///
/// Comparison itself is total; only rule construction can fail.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// An identity rule pattern is not a valid regular expression.
    #[error("invalid identity rule pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;

//! Registry error types.

use thiserror::Error;

/// Error type for registry configuration operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// A listener ceiling outside `[0, +inf]` was supplied. The ceiling
    /// in place before the call is left untouched.
    #[error("listener ceiling must be a non-negative number, got {value}")]
    CeilingOutOfRange {
        /// The rejected input.
        value: f64,
    },
}

/// Specialized `Result` type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

//! Convenience result type alias for Stashbox.

use crate::error::AppError;

/// A specialized `Result` type for Stashbox operations.
pub type AppResult<T> = Result<T, AppError>;

//! Convenience result type alias for Toolbox.

use crate::error::AppError;

/// A specialized `Result` type for Toolbox operations.
pub type AppResult<T> = Result<T, AppError>;

//! Storage provider implementations.

pub mod local;
pub mod memory;

use toolbox_core::error::AppError;
use toolbox_core::result::AppResult;

/// Reject keys that could escape the flat key namespace.
pub(crate) fn validate_key(key: &str) -> AppResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(AppError::validation(format!("Invalid storage key: {key:?}")))
    }
}

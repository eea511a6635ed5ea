//! Upload input policy.

use toolbox_core::error::AppError;
use toolbox_core::result::AppResult;

/// Longest accepted filename, in bytes.
pub const MAX_FILENAME_BYTES: usize = 255;

/// Check an uploader-supplied filename.
///
/// The name is only ever echoed back and used in `Content-Disposition`, but
/// it still must be a single path component free of control characters.
pub fn validate_filename(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Filename must not be empty."));
    }
    if name.len() > MAX_FILENAME_BYTES {
        return Err(AppError::validation(format!(
            "Filename must be at most {MAX_FILENAME_BYTES} bytes."
        )));
    }
    if name == "." || name == ".." {
        return Err(AppError::validation("Filename must not be '.' or '..'."));
    }
    if name.contains(['/', '\\']) {
        return Err(AppError::validation(
            "Filename must not contain path separators.",
        ));
    }
    if name.chars().any(char::is_control) {
        return Err(AppError::validation(
            "Filename must not contain control characters.",
        ));
    }
    Ok(())
}

/// Check the payload against the configured size limit.
pub fn validate_size(len: usize, max_bytes: u64) -> AppResult<()> {
    if len as u64 > max_bytes {
        return Err(AppError::payload_too_large(format!(
            "File exceeds the maximum upload size of {max_bytes} bytes."
        )));
    }
    Ok(())
}

//! Opaque identifier handed out for every shared file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Handle of a shared file: a random UUID v4.
///
/// The hyphenated string form doubles as the storage key of the content,
/// so parsing it is also what keeps caller input out of storage paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareHandle(Uuid);

impl ShareHandle {
    /// Create a new random handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return the inner UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }

    /// Storage key of the content blob.
    pub fn content_key(&self) -> String {
        self.0.hyphenated().to_string()
    }

    /// Storage key of the metadata sidecar.
    pub fn meta_key(&self) -> String {
        format!("{}{}", self.0.hyphenated(), Self::META_SUFFIX)
    }

    /// Suffix appended to the content key to form the metadata key.
    pub const META_SUFFIX: &'static str = ".meta";
}

impl Default for ShareHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ShareHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Only the lowercase hyphenated form is accepted, so every record has
/// exactly one textual handle.
impl FromStr for ShareHandle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::try_parse(s)
            .map_err(|e| AppError::validation(format!("Invalid share handle: {e}")))?;
        if uuid.hyphenated().to_string() != s {
            return Err(AppError::validation(
                "Share handle must be a lowercase hyphenated UUID",
            ));
        }
        Ok(Self(uuid))
    }
}

impl From<Uuid> for ShareHandle {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

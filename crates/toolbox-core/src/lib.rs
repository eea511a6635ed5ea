//! # toolbox-core
//!
//! Core crate for Toolbox. Contains the collaborator traits (storage and
//! delayed scheduling), configuration schemas, typed identifiers and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Toolbox crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;

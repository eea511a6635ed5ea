//! # toolbox-storage
//!
//! Storage provider implementations for Toolbox: a local filesystem
//! provider (the production default) and an in-memory provider used by
//! tests and throwaway deployments.

pub mod factory;
pub mod providers;

pub use factory::build_provider;
pub use providers::local::LocalStorageProvider;
pub use providers::memory::MemoryStorageProvider;

//! # toolbox-service
//!
//! Business logic for Toolbox. The [`share`] module holds the ephemeral
//! file store; [`network`] holds the diagnostic computations (subnet
//! arithmetic, address classification, geolocation, TLS inspection).
//!
//! Services follow constructor injection: collaborators are handed in as
//! `Arc<dyn Trait>` at construction time.

pub mod network;
pub mod share;

pub use network::{CertificateInspector, GeoLocator, MaxMindLocator};
pub use share::{EphemeralFileStore, ShareMeta, ShareReceipt, SharedFile};

//! Ephemeral file sharing with timed expiry.

pub mod locks;
pub mod record;
pub mod store;
pub mod validation;

pub use record::{ShareMeta, ShareReceipt, SharedFile};
pub use store::{EphemeralFileStore, RecoveryReport, StoreSettings};

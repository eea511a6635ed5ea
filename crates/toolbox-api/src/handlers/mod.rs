//! Request handlers organized by domain.

pub mod health;
pub mod network;
pub mod share;

//! Background scheduling for Toolbox.
//!
//! This crate provides the [`PollingScheduler`], the delayed-execution
//! collaborator that drives file expiry. Each registered task polls the
//! wall clock on its own tokio task, so a long-lived deadline survives
//! clock adjustments and never blocks request handling.

pub mod scheduler;

pub use scheduler::PollingScheduler;

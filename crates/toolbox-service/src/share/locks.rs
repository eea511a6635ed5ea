//! Per-handle critical sections.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use toolbox_core::types::ShareHandle;

/// Lazily created reader/writer lock per handle.
///
/// Readers (downloads) share the lock; writers (upload, expiry, purge,
/// delete-on-read) are exclusive. Entries are dropped again once no guard
/// references them, so the table only holds handles with operations in
/// flight.
#[derive(Debug, Clone, Default)]
pub struct HandleLocks {
    table: Arc<DashMap<ShareHandle, Arc<RwLock<()>>>>,
}

enum Held {
    Read(#[allow(dead_code)] OwnedRwLockReadGuard<()>),
    Write(#[allow(dead_code)] OwnedRwLockWriteGuard<()>),
}

/// Guard returned by [`HandleLocks`]; releases the lock on drop.
pub struct HandleGuard {
    held: Option<Held>,
    handle: ShareHandle,
    table: Arc<DashMap<ShareHandle, Arc<RwLock<()>>>>,
}

impl HandleLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the shared side of the handle's lock.
    pub async fn read(&self, handle: ShareHandle) -> HandleGuard {
        let guard = self.lock_for(handle).read_owned().await;
        self.guard(handle, Held::Read(guard))
    }

    /// Acquire the exclusive side of the handle's lock.
    pub async fn write(&self, handle: ShareHandle) -> HandleGuard {
        let guard = self.lock_for(handle).write_owned().await;
        self.guard(handle, Held::Write(guard))
    }

    /// Number of handles that currently have a lock entry.
    pub fn active(&self) -> usize {
        self.table.len()
    }

    fn lock_for(&self, handle: ShareHandle) -> Arc<RwLock<()>> {
        self.table.entry(handle).or_default().clone()
    }

    fn guard(&self, handle: ShareHandle, held: Held) -> HandleGuard {
        HandleGuard {
            held: Some(held),
            handle,
            table: Arc::clone(&self.table),
        }
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.held.take();
        self.table
            .remove_if(&self.handle, |_, lock| Arc::strong_count(lock) == 1);
    }
}

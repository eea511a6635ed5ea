//! Ephemeral file store: keeps uploads for a fixed retention window.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use toolbox_core::config::share::ShareConfig;
use toolbox_core::error::{AppError, ErrorKind};
use toolbox_core::result::AppResult;
use toolbox_core::traits::scheduler::{DelayedTaskScheduler, ScheduledAction, TaskOutcome};
use toolbox_core::traits::storage::StorageProvider;
use toolbox_core::types::ShareHandle;

use super::locks::HandleLocks;
use super::record::{ShareMeta, ShareReceipt, SharedFile, upload_message};
use super::validation::{validate_filename, validate_size};

/// How many fresh handles an upload tries before giving up with `Conflict`.
const MAX_HANDLE_ATTEMPTS: usize = 3;

/// Message used for every unknown, expired or removed handle.
pub const NOT_FOUND_MESSAGE: &str = "File not found or expired.";

/// Behavioural knobs of the store.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Time an upload stays retrievable.
    pub retention: Duration,
    /// Remove a record after its first successful read.
    pub delete_on_read: bool,
    /// Largest accepted payload.
    pub max_upload_size_bytes: u64,
}

impl From<&ShareConfig> for StoreSettings {
    fn from(config: &ShareConfig) -> Self {
        Self {
            retention: config.retention(),
            delete_on_read: config.delete_on_read,
            max_upload_size_bytes: config.max_upload_size_bytes,
        }
    }
}

/// Outcome of one expiry attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expiry {
    Removed,
    AlreadyGone,
    NotDue(DateTime<Utc>),
}

/// Counts produced by [`EphemeralFileStore::recover`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RecoveryReport {
    /// Live records whose expiry was armed again.
    pub rescheduled: usize,
    /// Records already past their deadline, removed.
    pub expired: usize,
    /// Content without metadata, or unreadable metadata, removed.
    pub orphans_removed: usize,
    /// Temporary files of interrupted writes, removed.
    pub incomplete_removed: usize,
}

/// Stores uploaded files under opaque handles and removes them once their
/// retention window has elapsed.
///
/// Content lives under `{handle}` and metadata under `{handle}.meta` in the
/// storage collaborator. All operations on one handle are serialized by a
/// per-handle lock; reads share it.
#[derive(Debug, Clone)]
pub struct EphemeralFileStore {
    inner: Arc<StoreInner>,
    scheduler: Arc<dyn DelayedTaskScheduler>,
}

/// State shared with scheduled expiry actions. It holds no reference to the
/// scheduler, so a pending action never keeps the scheduler alive.
#[derive(Debug)]
struct StoreInner {
    storage: Arc<dyn StorageProvider>,
    locks: HandleLocks,
    settings: StoreSettings,
}

impl EphemeralFileStore {
    /// Create a store on top of the given collaborators.
    pub fn new(
        storage: Arc<dyn StorageProvider>,
        scheduler: Arc<dyn DelayedTaskScheduler>,
        settings: StoreSettings,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                storage,
                locks: HandleLocks::new(),
                settings,
            }),
            scheduler,
        }
    }

    /// Active settings.
    pub fn settings(&self) -> &StoreSettings {
        &self.inner.settings
    }

    /// Storage collaborator in use.
    pub fn storage(&self) -> &Arc<dyn StorageProvider> {
        &self.inner.storage
    }

    /// Expiry tasks that have not completed yet.
    pub fn pending_expirations(&self) -> usize {
        self.scheduler.pending()
    }

    /// Store `content` under a fresh handle and arm its expiry.
    ///
    /// Nothing is addressable unless both content and metadata were written;
    /// a failed metadata write removes the content again.
    pub async fn put(&self, original_name: &str, content: Bytes) -> AppResult<ShareReceipt> {
        validate_filename(original_name)?;
        validate_size(content.len(), self.inner.settings.max_upload_size_bytes)?;

        for attempt in 1..=MAX_HANDLE_ATTEMPTS {
            let handle = ShareHandle::new();
            let guard = self.inner.locks.write(handle).await;

            if self.inner.is_taken(handle).await? {
                warn!(handle = %handle, attempt, "Share handle collision, generating a new one");
                continue;
            }

            let created_at = Utc::now();
            let expires_at = self.expiry_for(created_at)?;
            let meta = ShareMeta {
                handle,
                original_name: original_name.to_string(),
                size_bytes: content.len() as u64,
                created_at,
                expires_at,
            };

            self.inner.write_record(&meta, content).await?;
            drop(guard);

            self.schedule_expiry(handle, expires_at);
            info!(
                handle = %handle,
                size_bytes = meta.size_bytes,
                expires_at = %expires_at,
                "Stored shared file"
            );

            return Ok(ShareReceipt {
                handle,
                original_name: meta.original_name,
                expires_at,
                message: upload_message(self.inner.settings.retention),
            });
        }

        Err(AppError::conflict(format!(
            "Could not allocate a unique handle after {MAX_HANDLE_ATTEMPTS} attempts"
        )))
    }

    /// Fetch a live record.
    ///
    /// Unknown, malformed, expired and removed handles all yield `NotFound`;
    /// a malformed handle is rejected without touching storage.
    pub async fn get(&self, handle: &str) -> AppResult<SharedFile> {
        let Ok(handle) = handle.parse::<ShareHandle>() else {
            debug!(handle, "Rejected malformed share handle");
            return Err(AppError::not_found(NOT_FOUND_MESSAGE));
        };

        let delete_on_read = self.inner.settings.delete_on_read;
        let guard = if delete_on_read {
            self.inner.locks.write(handle).await
        } else {
            self.inner.locks.read(handle).await
        };

        let meta = match self.inner.load_meta(handle).await {
            Ok(Some(meta)) => meta,
            Ok(None) => return Err(AppError::not_found(NOT_FOUND_MESSAGE)),
            Err(e) if e.kind == ErrorKind::Serialization => {
                warn!(handle = %handle, error = %e, "Unreadable metadata, treating record as absent");
                return Err(AppError::not_found(NOT_FOUND_MESSAGE));
            }
            Err(e) => return Err(e),
        };

        if meta.is_expired_at(Utc::now()) {
            drop(guard);
            if let Err(e) = self.inner.expire(handle).await {
                warn!(handle = %handle, error = %e, "Eager removal of expired file failed");
            }
            return Err(AppError::not_found(NOT_FOUND_MESSAGE));
        }

        let content = match self.inner.storage.read(&handle.content_key()).await {
            Ok(content) => content,
            Err(e) if e.is_not_found() => return Err(AppError::not_found(NOT_FOUND_MESSAGE)),
            Err(e) => return Err(e),
        };

        if delete_on_read {
            self.inner.remove_locked(handle).await?;
            info!(handle = %handle, "Shared file removed after download");
        }

        Ok(SharedFile { meta, content })
    }

    /// Arrange for `handle` to be removed once `expires_at` has passed.
    ///
    /// Safe to call repeatedly: the latest registration wins and removal of
    /// an already-removed record is a no-op.
    pub fn schedule_expiry(&self, handle: ShareHandle, expires_at: DateTime<Utc>) {
        let inner = Arc::clone(&self.inner);
        let action: ScheduledAction = Arc::new(move || {
            let inner = Arc::clone(&inner);
            async move {
                Ok(match inner.expire(handle).await? {
                    Expiry::NotDue(deadline) => TaskOutcome::Reschedule(deadline),
                    Expiry::Removed | Expiry::AlreadyGone => TaskOutcome::Completed,
                })
            }
            .boxed()
        });
        self.scheduler.after(handle.to_string(), expires_at, action);
    }

    /// Remove a record regardless of its expiry. Returns whether it existed.
    pub async fn purge(&self, handle: &str) -> AppResult<bool> {
        let Ok(handle) = handle.parse::<ShareHandle>() else {
            return Ok(false);
        };
        let _guard = self.inner.locks.write(handle).await;
        let existed = self.inner.storage.exists(&handle.meta_key()).await?
            || self.inner.storage.exists(&handle.content_key()).await?;
        self.inner.remove_locked(handle).await?;
        if existed {
            info!(handle = %handle, "Shared file purged");
        }
        Ok(existed)
    }

    /// Remove every record whose deadline has passed. Returns how many.
    pub async fn sweep(&self) -> AppResult<usize> {
        let (meta_handles, _) = self.inner.scan().await?;
        let mut removed = 0;
        for handle in meta_handles {
            match self.inner.expire(handle).await {
                Ok(Expiry::Removed) => removed += 1,
                Ok(_) => {}
                Err(e) => warn!(handle = %handle, error = %e, "Sweep could not remove record"),
            }
        }
        info!(removed, "Sweep finished");
        Ok(removed)
    }

    /// Metadata of every record currently in storage, oldest first.
    pub async fn list(&self) -> AppResult<Vec<ShareMeta>> {
        let (meta_handles, _) = self.inner.scan().await?;
        let mut records = Vec::with_capacity(meta_handles.len());
        for handle in meta_handles {
            match self.inner.load_meta(handle).await {
                Ok(Some(meta)) => records.push(meta),
                Ok(None) => {}
                Err(e) => warn!(handle = %handle, error = %e, "Skipping unreadable metadata"),
            }
        }
        records.sort_by_key(|meta| meta.created_at);
        Ok(records)
    }

    /// Rebuild expiry state from storage after a restart.
    ///
    /// Expired records and leftovers of interrupted uploads are removed;
    /// every live record gets its expiry armed again. Meant to run before
    /// the store starts serving.
    pub async fn recover(&self) -> AppResult<RecoveryReport> {
        let mut report = RecoveryReport {
            incomplete_removed: self.inner.storage.remove_incomplete().await?,
            ..RecoveryReport::default()
        };
        let (meta_handles, content_handles) = self.inner.scan().await?;
        let now = Utc::now();

        for &handle in &meta_handles {
            match self.inner.load_meta(handle).await {
                Ok(Some(meta)) if meta.is_expired_at(now) => {
                    match self.inner.expire(handle).await {
                        Ok(Expiry::Removed) => report.expired += 1,
                        Ok(_) => {}
                        Err(e) => {
                            warn!(handle = %handle, error = %e, "Could not remove expired record, retrying via scheduler");
                            self.schedule_expiry(handle, meta.expires_at);
                        }
                    }
                }
                Ok(Some(meta)) => {
                    self.schedule_expiry(handle, meta.expires_at);
                    report.rescheduled += 1;
                }
                Ok(None) => {}
                Err(e) if e.kind == ErrorKind::Serialization => {
                    warn!(handle = %handle, error = %e, "Removing record with unreadable metadata");
                    let _guard = self.inner.locks.write(handle).await;
                    self.inner.remove_locked(handle).await?;
                    report.orphans_removed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        for handle in content_handles.difference(&meta_handles) {
            let _guard = self.inner.locks.write(*handle).await;
            if !self.inner.storage.exists(&handle.meta_key()).await? {
                warn!(handle = %handle, "Removing content without metadata");
                self.inner.storage.delete(&handle.content_key()).await?;
                report.orphans_removed += 1;
            }
        }

        info!(
            rescheduled = report.rescheduled,
            expired = report.expired,
            orphans_removed = report.orphans_removed,
            incomplete_removed = report.incomplete_removed,
            "Share store recovery complete"
        );
        Ok(report)
    }

    fn expiry_for(&self, created_at: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        let delta = chrono::Duration::from_std(self.inner.settings.retention)
            .map_err(|e| AppError::configuration(format!("Retention out of range: {e}")))?;
        created_at.checked_add_signed(delta).ok_or_else(|| {
            AppError::configuration("Retention pushes the expiry past the supported date range")
        })
    }
}

impl StoreInner {
    async fn is_taken(&self, handle: ShareHandle) -> AppResult<bool> {
        Ok(self.storage.exists(&handle.content_key()).await?
            || self.storage.exists(&handle.meta_key()).await?)
    }

    /// Write content, then metadata. Caller holds the write lock.
    async fn write_record(&self, meta: &ShareMeta, content: Bytes) -> AppResult<()> {
        let handle = meta.handle;
        let meta_bytes = Bytes::from(serde_json::to_vec(meta)?);

        if let Err(e) = self.storage.write(&handle.content_key(), content).await {
            error!(handle = %handle, error = %e, "Failed to write shared file content");
            self.discard_content(handle).await;
            return Err(as_storage_error(e));
        }

        if let Err(e) = self.storage.write(&handle.meta_key(), meta_bytes).await {
            error!(handle = %handle, error = %e, "Failed to write shared file metadata");
            self.discard_content(handle).await;
            return Err(as_storage_error(e));
        }

        Ok(())
    }

    async fn discard_content(&self, handle: ShareHandle) {
        if let Err(e) = self.storage.delete(&handle.content_key()).await {
            error!(handle = %handle, error = %e, "Failed to clean up partial upload");
        }
    }

    /// `Ok(None)` when no metadata exists for the handle.
    async fn load_meta(&self, handle: ShareHandle) -> AppResult<Option<ShareMeta>> {
        match self.storage.read(&handle.meta_key()).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Remove the record if its deadline has passed.
    async fn expire(&self, handle: ShareHandle) -> AppResult<Expiry> {
        let _guard = self.locks.write(handle).await;

        match self.load_meta(handle).await {
            Ok(Some(meta)) if !meta.is_expired_at(Utc::now()) => {
                return Ok(Expiry::NotDue(meta.expires_at));
            }
            Ok(Some(_)) => {}
            Ok(None) => {
                self.storage.delete(&handle.content_key()).await?;
                return Ok(Expiry::AlreadyGone);
            }
            Err(e) if e.kind == ErrorKind::Serialization => {
                warn!(handle = %handle, error = %e, "Expiring record with unreadable metadata");
            }
            Err(e) => return Err(e),
        }

        self.remove_locked(handle).await?;
        info!(handle = %handle, "Expired shared file removed");
        Ok(Expiry::Removed)
    }

    /// Delete content, then metadata. Caller holds the write lock.
    async fn remove_locked(&self, handle: ShareHandle) -> AppResult<()> {
        self.storage.delete(&handle.content_key()).await?;
        self.storage.delete(&handle.meta_key()).await?;
        Ok(())
    }

    /// Handles that have metadata, and handles that have content.
    async fn scan(&self) -> AppResult<(BTreeSet<ShareHandle>, BTreeSet<ShareHandle>)> {
        let mut metas = BTreeSet::new();
        let mut contents = BTreeSet::new();
        for object in self.storage.list().await? {
            match object.key.strip_suffix(ShareHandle::META_SUFFIX) {
                Some(stem) => {
                    if let Ok(handle) = stem.parse() {
                        metas.insert(handle);
                    }
                }
                None => {
                    if let Ok(handle) = object.key.parse() {
                        contents.insert(handle);
                    }
                }
            }
        }
        Ok((metas, contents))
    }
}

fn as_storage_error(err: AppError) -> AppError {
    if err.kind == ErrorKind::Storage {
        err
    } else {
        AppError::storage(format!("Storage write failed: {}", err.message))
    }
}

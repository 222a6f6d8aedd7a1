//! Keyed registry of in-flight downloads
//!
//! Each key (a pair index or the zoom modal) owns an independent busy flag. A flag is
//! held by a [`DownloadGuard`] and cleared when the guard drops, on every exit path.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

use crate::constants::MODAL_DOWNLOAD_KEY;
use crate::error::ClientError;
use crate::hooks::{ObjectRef, ObjectStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadKey {
    /// Download button of the card at this position
    Pair(usize),
    /// Download button of the zoom modal
    Modal,
}

impl fmt::Display for DownloadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadKey::Pair(index) => write!(f, "{}", index),
            DownloadKey::Modal => f.write_str(MODAL_DOWNLOAD_KEY),
        }
    }
}

#[derive(Clone, Default)]
pub struct DownloadRegistry {
    busy: Arc<DashMap<DownloadKey, ()>>,
}

impl DownloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` busy. Returns `None` when a download for that key is already running.
    pub fn try_acquire(&self, key: DownloadKey) -> Option<DownloadGuard> {
        match self.busy.entry(key) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(DownloadGuard {
                    key,
                    busy: Arc::clone(&self.busy),
                })
            }
        }
    }

    pub fn is_busy(&self, key: DownloadKey) -> bool {
        self.busy.contains_key(&key)
    }

    pub fn busy_keys(&self) -> Vec<DownloadKey> {
        self.busy.iter().map(|entry| *entry.key()).collect()
    }
}

/// Busy flag for one key; released on drop
pub struct DownloadGuard {
    key: DownloadKey,
    busy: Arc<DashMap<DownloadKey, ()>>,
}

impl DownloadGuard {
    pub fn key(&self) -> DownloadKey {
        self.key
    }
}

impl Drop for DownloadGuard {
    fn drop(&mut self) {
        self.busy.remove(&self.key);
    }
}

/// A local object created from downloaded bytes, released back to its store on drop
pub(crate) struct ObjectLease {
    store: Arc<dyn ObjectStore>,
    object: Option<ObjectRef>,
}

impl ObjectLease {
    pub(crate) fn new(store: Arc<dyn ObjectStore>, object: ObjectRef) -> Self {
        Self {
            store,
            object: Some(object),
        }
    }

    pub(crate) fn save_as(&self, file_name: &str) -> Result<String, ClientError> {
        match &self.object {
            Some(object) => self.store.save_as(object, file_name),
            None => Err(ClientError::Storage("object already released".to_string())),
        }
    }
}

impl Drop for ObjectLease {
    fn drop(&mut self) {
        if let Some(object) = self.object.take() {
            self.store.release(object);
        }
    }
}

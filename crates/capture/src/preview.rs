//! Short-lived preview references for captured frames.
//!
//! A [`PreviewHandle`] registers the frame bytes under a [`PreviewId`] the
//! UI can look up, and revokes the entry when dropped. The flow keeps the
//! handle next to the frame it previews, so releasing the frame releases
//! the preview.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identifier of a registered preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewId(u64);

impl fmt::Display for PreviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preview:{}", self.0)
    }
}

#[derive(Default)]
struct Entries {
    next_id: u64,
    live: HashMap<PreviewId, Arc<[u8]>>,
}

/// Shared table of outstanding previews.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<Mutex<Entries>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` and return the owning handle.
    pub fn register(&self, bytes: Arc<[u8]>) -> PreviewHandle {
        let mut entries = self.lock();
        entries.next_id += 1;
        let id = PreviewId(entries.next_id);
        entries.live.insert(id, bytes);
        PreviewHandle {
            id,
            registry: self.clone(),
        }
    }

    /// Bytes behind `id`, or `None` once the preview has been revoked.
    pub fn get(&self, id: PreviewId) -> Option<Arc<[u8]>> {
        self.lock().live.get(&id).cloned()
    }

    /// Number of previews not yet revoked.
    pub fn outstanding(&self) -> usize {
        self.lock().live.len()
    }

    fn revoke(&self, id: PreviewId) {
        if self.lock().live.remove(&id).is_some() {
            tracing::trace!(%id, "Preview revoked");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PreviewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewRegistry")
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

/// Owning reference to a registered preview. Revokes on drop.
pub struct PreviewHandle {
    id: PreviewId,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn id(&self) -> PreviewId {
        self.id
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.revoke(self.id);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.id).finish()
    }
}

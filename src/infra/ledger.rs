use std::sync::Arc;

use crate::app::ports::{ObjectStorePort, Presence, StoreError};
use crate::constants::LEDGER_PREFIX;
use crate::domain::StoreLocation;

/// Processed-file ledger: one zero-byte marker object per content token.
/// Marker presence is the sole source of truth for "already processed";
/// `mark` must only be called once a file's output is durably committed.
pub struct MarkerLedger {
    store: Arc<dyn ObjectStorePort>,
}

impl MarkerLedger {
    pub fn new(store: Arc<dyn ObjectStorePort>) -> Self {
        Self { store }
    }

    fn marker_location(container: &str, token: &str) -> StoreLocation {
        StoreLocation::new(container, format!("{}/etag={}", LEDGER_PREFIX, token))
    }

    /// Point lookup of the marker. A lookup failure propagates as an error;
    /// it is never treated as absence.
    pub async fn exists(&self, container: &str, token: &str) -> Result<bool, StoreError> {
        match self
            .store
            .head(&Self::marker_location(container, token))
            .await?
        {
            Presence::Present => Ok(true),
            Presence::Absent => Ok(false),
        }
    }

    /// Writes the marker. Idempotent: marking an already-marked token is a
    /// no-op at the store level.
    pub async fn mark(&self, container: &str, token: &str) -> Result<(), StoreError> {
        self.store
            .put(&Self::marker_location(container, token), &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::fs_store::FsObjectStore;

    #[tokio::test]
    async fn exists_is_false_until_marked() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = MarkerLedger::new(Arc::new(FsObjectStore::new(dir.path())));

        assert!(!ledger.exists("inbox", "abc123").await.unwrap());
        ledger.mark("inbox", "abc123").await.unwrap();
        assert!(ledger.exists("inbox", "abc123").await.unwrap());

        // Marking again is harmless
        ledger.mark("inbox", "abc123").await.unwrap();
        assert!(ledger.exists("inbox", "abc123").await.unwrap());
    }

    #[tokio::test]
    async fn tokens_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = MarkerLedger::new(Arc::new(FsObjectStore::new(dir.path())));

        ledger.mark("inbox", "abc123").await.unwrap();
        assert!(!ledger.exists("inbox", "def456").await.unwrap());
    }
}

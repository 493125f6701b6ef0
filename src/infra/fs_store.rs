use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::app::ports::{ObjectStorePort, Presence, StoreError};
use crate::domain::StoreLocation;

/// Filesystem-backed object store: containers are directories under a root,
/// object keys are relative paths within them. Used by tests and local runs;
/// production deployments supply their own `ObjectStorePort`.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, location: &StoreLocation) -> PathBuf {
        self.root.join(&location.container).join(&location.key)
    }
}

#[async_trait]
impl ObjectStorePort for FsObjectStore {
    async fn get(&self, location: &StoreLocation) -> Result<Vec<u8>, StoreError> {
        fs::read(self.object_path(location)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(location.to_string()),
            _ => StoreError::Io(e),
        })
    }

    async fn head(&self, location: &StoreLocation) -> Result<Presence, StoreError> {
        match fs::metadata(self.object_path(location)) {
            Ok(_) => Ok(Presence::Present),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Presence::Absent),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn put(&self, location: &StoreLocation, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.object_path(location);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_and_head() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        let loc = StoreLocation::new("inbox", "reports/batch_1.csv");

        assert_eq!(store.head(&loc).await.unwrap(), Presence::Absent);
        store.put(&loc, b"a,b\n1,2\n").await.unwrap();
        assert_eq!(store.head(&loc).await.unwrap(), Presence::Present);
        assert_eq!(store.get(&loc).await.unwrap(), b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        let loc = StoreLocation::new("inbox", "absent.csv");

        match store.get(&loc).await {
            Err(StoreError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other.map(|b| b.len())),
        }
    }
}

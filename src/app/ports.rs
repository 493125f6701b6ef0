use async_trait::async_trait;
use thiserror::Error;

use crate::domain::StoreLocation;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a point lookup. Absence is a successful answer, distinct from a
/// failed lookup; callers must never infer "absent" from an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
}

/// Durable object store the pipeline reads source files from and writes
/// markers and dataset part files to. Single-object writes are atomic.
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    async fn get(&self, location: &StoreLocation) -> Result<Vec<u8>, StoreError>;
    async fn head(&self, location: &StoreLocation) -> Result<Presence, StoreError>;
    async fn put(&self, location: &StoreLocation, bytes: &[u8]) -> Result<(), StoreError>;
}

//! Key/value storage abstraction (the host's persisted storage service).

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub use memory::InMemoryStorage;

/// Storage operation error.
///
/// `Decode` is kept apart from `Io` so that a corrupt entry is never mistaken
/// for an unreachable store (or for a missing one).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(String),

    #[error("malformed entry at '{key}': {reason}")]
    Decode { key: String, reason: String },

    #[error("failed to encode entry for '{key}': {reason}")]
    Encode { key: String, reason: String },
}

/// Storage service contract consumed by the backend.
///
/// Implementations provide atomic per-key reads and writes; nothing above this
/// trait caches values.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;
    /// Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
    /// Key suffixes under `prefix`, in ascending order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

#[async_trait]
impl<S> Storage for Arc<S>
where
    S: Storage + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        (**self).put(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        (**self).list(prefix).await
    }
}

/// Read and decode a JSON entry.
pub async fn get_json<T, S>(storage: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: Storage + ?Sized,
{
    let Some(bytes) = storage.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StorageError::Decode {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// Encode and write a JSON entry, replacing any previous value.
pub async fn put_json<T, S>(storage: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: Storage + ?Sized,
{
    let bytes = serde_json::to_vec(value).map_err(|e| StorageError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    storage.put(key, bytes).await
}

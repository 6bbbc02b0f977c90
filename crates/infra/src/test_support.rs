//! Stubs shared by unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use runauth_auth::GrantSigner;

use crate::oracle::{OracleError, RunOracle, RunQuery, RunStatus};
use crate::storage::{InMemoryStorage, Storage, StorageError};

pub fn test_signer() -> GrantSigner {
    GrantSigner::new(b"test-signing-key-test-signing-key").expect("32-byte key")
}

/// Oracle returning a scripted answer and counting calls.
pub struct StubOracle {
    answer: Mutex<Result<RunStatus, OracleError>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_base_url: Mutex<Option<String>>,
}

impl StubOracle {
    pub fn running(run_number: i64) -> Self {
        Self::answering(Ok(RunStatus {
            status: "in_progress".to_string(),
            run_number,
        }))
    }

    pub fn with_status(status: &str, run_number: i64) -> Self {
        Self::answering(Ok(RunStatus {
            status: status.to_string(),
            run_number,
        }))
    }

    pub fn failing(err: OracleError) -> Self {
        Self::answering(Err(err))
    }

    fn answering(answer: Result<RunStatus, OracleError>) -> Self {
        Self {
            answer: Mutex::new(answer),
            delay: None,
            calls: AtomicUsize::new(0),
            last_base_url: Mutex::new(None),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Change what later calls observe (e.g. the run finishing).
    pub fn set_status(&self, status: &str, run_number: i64) {
        *self.answer.lock().unwrap() = Ok(RunStatus {
            status: status.to_string(),
            run_number,
        });
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_base_url(&self) -> Option<String> {
        self.last_base_url.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunOracle for StubOracle {
    async fn get_workflow_run(
        &self,
        query: &RunQuery<'_>,
        _credential: &str,
    ) -> Result<RunStatus, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_base_url.lock().unwrap() = query.base_url.map(|u| u.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer.lock().unwrap().clone()
    }
}

/// In-memory storage whose reads fail for keys under one prefix.
pub struct FailingStorage {
    inner: InMemoryStorage,
    failing_prefix: String,
}

impl FailingStorage {
    pub fn failing_reads_under(prefix: &str) -> Self {
        Self {
            inner: InMemoryStorage::new(),
            failing_prefix: prefix.to_string(),
        }
    }
}

#[async_trait]
impl Storage for FailingStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if key.starts_with(&self.failing_prefix) {
            return Err(StorageError::Io("connection reset".to_string()));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.inner.list(prefix).await
    }
}

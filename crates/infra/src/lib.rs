//! Infrastructure layer: storage, oracle client, and the login/renewal backend.

pub mod backend;
pub mod config_store;
pub mod lease_store;
pub mod oracle;
pub mod policy_store;
pub mod storage;
pub mod verifier;

#[cfg(test)]
mod test_support;

pub use backend::Backend;
pub use config_store::BackendConfig;
pub use lease_store::{LeaseRecord, LeaseStore};
pub use oracle::{GitHubRunOracle, OracleError, RunOracle, RunQuery, RunStatus};
pub use policy_store::{Lookup, PolicyEntry, PolicyKind, PolicyStore};
pub use storage::{InMemoryStorage, Storage, StorageError};
pub use verifier::{DEFAULT_ORACLE_TIMEOUT, RUN_IN_PROGRESS, RunVerifier, is_run_eligible};

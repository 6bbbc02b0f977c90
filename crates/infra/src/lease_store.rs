//! Server-side lease records, keyed `lease/<lease_id>`.
//!
//! A record is the authoritative copy of an issued grant plus the renewal data
//! (including the run token) that never leaves the server.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use runauth_auth::{RenewalData, SessionGrant};

use crate::policy_store::Lookup;
use crate::storage::{Storage, StorageError, get_json, put_json};

pub const LEASE_PREFIX: &str = "lease/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseRecord {
    pub grant: SessionGrant,
    pub renewal: RenewalData,
}

#[derive(Clone)]
pub struct LeaseStore {
    storage: Arc<dyn Storage>,
}

impl LeaseStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn key(lease_id: Uuid) -> String {
        format!("{LEASE_PREFIX}{lease_id}")
    }

    pub async fn get(&self, lease_id: Uuid) -> Result<Lookup<LeaseRecord>, StorageError> {
        Ok(match get_json::<LeaseRecord, _>(&*self.storage, &Self::key(lease_id)).await? {
            Some(record) => Lookup::Found(record),
            None => Lookup::NotFound,
        })
    }

    pub async fn put(&self, record: &LeaseRecord) -> Result<(), StorageError> {
        put_json(&*self.storage, &Self::key(record.grant.lease_id), record).await
    }
}

//! Persisted backend configuration (`config` key).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use runauth_auth::BoundCidrs;

use crate::storage::{Storage, StorageError, get_json, put_json};

const CONFIG_KEY: &str = "config";

/// Backend-wide settings consulted on every login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Networks logins may originate from; empty means unrestricted.
    #[serde(default)]
    pub bound_cidrs: BoundCidrs,

    /// Alternate oracle API base (e.g. a GitHub Enterprise `/api/v3` URL).
    #[serde(default)]
    pub base_url: Option<Url>,
}

#[derive(Clone)]
pub struct ConfigStore {
    storage: Arc<dyn Storage>,
}

impl ConfigStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Current configuration; defaults when nothing has been written yet.
    pub async fn load(&self) -> Result<BackendConfig, StorageError> {
        Ok(get_json::<BackendConfig, _>(&*self.storage, CONFIG_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn save(&self, config: &BackendConfig) -> Result<(), StorageError> {
        put_json(&*self.storage, CONFIG_KEY, config).await
    }
}

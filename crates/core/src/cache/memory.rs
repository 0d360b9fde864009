//! In-memory cache storage.
//!
//! Lives for the lifetime of the process. Used for ephemeral runs and as
//! the injected cache in tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use super::hash::request_key;
use super::storage::CacheStorage;
use crate::Error;
use crate::http::Response;

type Stores = BTreeMap<String, HashMap<String, Response>>;

/// Process-local [`CacheStorage`] backed by a map of maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    stores: Arc<RwLock<Stores>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCache {
    async fn open(&self, store: &str) -> Result<(), Error> {
        self.stores.write().await.entry(store.to_string()).or_default();
        Ok(())
    }

    async fn has(&self, store: &str) -> Result<bool, Error> {
        Ok(self.stores.read().await.contains_key(store))
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.stores.read().await.keys().cloned().collect())
    }

    async fn delete(&self, store: &str) -> Result<bool, Error> {
        Ok(self.stores.write().await.remove(store).is_some())
    }

    async fn match_url(&self, store: &str, url: &Url) -> Result<Option<Response>, Error> {
        let key = request_key(url);
        let stores = self.stores.read().await;
        Ok(stores.get(store).and_then(|entries| entries.get(&key)).cloned())
    }

    async fn put(&self, store: &str, url: &Url, response: &Response) -> Result<(), Error> {
        let key = request_key(url);
        let mut stores = self.stores.write().await;
        stores.entry(store.to_string()).or_default().insert(key, response.clone());
        Ok(())
    }

    async fn put_all(&self, store: &str, entries: &[(Url, Response)]) -> Result<(), Error> {
        let batch: HashMap<String, Response> =
            entries.iter().map(|(url, response)| (request_key(url), response.clone())).collect();
        let mut stores = self.stores.write().await;
        stores.entry(store.to_string()).or_default().extend(batch);
        Ok(())
    }

    async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        Ok(self.stores.read().await.get(store).map(|e| e.len() as u64).unwrap_or(0))
    }
}

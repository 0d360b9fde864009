//! The response-cache primitive: named stores of request → response snapshots.

use async_trait::async_trait;
use url::Url;

use crate::Error;
use crate::http::Response;

/// A key–value response cache partitioned into named stores.
///
/// Stores are created on first `open` or `put`. Writes to the same key
/// replace the previous entry; there is no other coordination between
/// concurrent writers.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named store if it does not exist yet.
    async fn open(&self, store: &str) -> Result<(), Error>;

    /// Whether the named store exists.
    async fn has(&self, store: &str) -> Result<bool, Error>;

    /// Names of all existing stores, in name order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a store and all of its entries.
    ///
    /// Returns false if the store did not exist.
    async fn delete(&self, store: &str) -> Result<bool, Error>;

    /// Look up the entry stored for a request URL.
    async fn match_url(&self, store: &str, url: &Url) -> Result<Option<Response>, Error>;

    /// Store a response snapshot for a request URL.
    async fn put(&self, store: &str, url: &Url, response: &Response) -> Result<(), Error>;

    /// Create the store and write every entry, or write nothing at all.
    ///
    /// Readers never observe the store half filled.
    async fn put_all(&self, store: &str, entries: &[(Url, Response)]) -> Result<(), Error>;

    /// Number of entries in a store (0 when it does not exist).
    async fn entry_count(&self, store: &str) -> Result<u64, Error>;
}

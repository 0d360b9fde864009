//! The network-fetch primitive the interceptor consumes.

use async_trait::async_trait;

use crate::Error;
use crate::http::{Request, Response};

/// Fetches a single request from the network.
///
/// Implementations return `Ok` for any response the server produced,
/// including error statuses. `Err` is reserved for failures where no
/// response arrived at all (offline, refused, timed out).
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

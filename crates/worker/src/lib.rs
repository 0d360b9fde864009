//! Offline cache interceptor for the Lisbon trip app.
//!
//! A [`Worker`] sits between the app's pages and the network. It
//! pre-populates one cache store per deployed generation at install,
//! drops every other store at activation, and answers intercepted GET
//! requests cache-first with an ordered offline fallback chain.
//!
//! The cache and the network are injected ([`lisboa_core::CacheStorage`],
//! [`lisboa_core::Network`]), so the same worker runs over SQLite and
//! reqwest in the binary and over in-memory fakes in tests.

pub mod classify;
pub mod fallback;
pub mod lifecycle;
pub mod manifest;
pub mod rules;
pub mod site;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{RequestClass, classify};
pub use lifecycle::{Generation, WorkerState};
pub use manifest::{AssetManifest, BuildInfo};
pub use rules::{FallbackRule, PassReason};
pub use site::{DynamicKind, SiteProfile};
pub use worker::{FetchOutcome, ResponseSource, Worker, WorkerOptions};

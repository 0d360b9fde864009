//! Named response caches.
//!
//! Each deployed generation owns one store; entries are response snapshots
//! keyed by a SHA-256 of the request URL. Two backends implement
//! [`CacheStorage`]:
//!
//! - [`CacheDb`]: SQLite via tokio-rusqlite, WAL mode, survives restarts
//! - [`MemoryCache`]: process-local, for ephemeral runs and tests

pub mod connection;
pub mod entries;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod storage;

pub use crate::Error;

pub use connection::CacheDb;
pub use hash::request_key;
pub use memory::MemoryCache;
pub use storage::CacheStorage;

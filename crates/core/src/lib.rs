//! Core types and shared functionality for lisboa-sw.
//!
//! This crate provides:
//! - Request/response snapshot types
//! - The cache storage and network seams, with SQLite and in-memory caches
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod net;

pub use cache::{CacheDb, CacheStorage, MemoryCache};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{Request, RequestMode, Response, ResponseKind};
pub use net::Network;

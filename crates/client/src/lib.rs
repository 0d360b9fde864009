//! Client code for lisboa-sw.
//!
//! This crate provides the reqwest-backed network used by the interceptor
//! and the flight status client behind the app's flights endpoint.

pub mod fetch;
pub mod flights;

pub use fetch::{FetchClient, FetchConfig};
pub use flights::{Flight, FlightClient, FlightConfig, FlightError, FlightQuery};

//! Worker lifecycle states and the cache generation they are tied to.

use std::fmt;

/// Lifecycle state of one worker generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    New,
    Installing,
    Installed,
    Activating,
    Active,
    /// Install failed; this generation will never serve requests.
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::New => "new",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        }
    }

    /// Whether intercepted requests go through the cache.
    pub fn controls_clients(&self) -> bool {
        matches!(self, WorkerState::Active)
    }

    pub fn can_install(&self) -> bool {
        matches!(self, WorkerState::New | WorkerState::Redundant)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a deployed build. Each generation owns exactly one store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Generation(String);

impl Generation {
    pub const STORE_PREFIX: &'static str = "cache-";

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Name of the cache store owned by this generation.
    pub fn store_name(&self) -> String {
        format!("{}{}", Self::STORE_PREFIX, self.0)
    }

    pub fn owns(&self, store: &str) -> bool {
        store == self.store_name()
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Ordered rule tables for interception and offline fallback.
//!
//! Both tables are evaluated top to bottom and the first matching rule
//! wins. Predicates are plain functions over [`RequestClass`].

use std::fmt;

use crate::classify::RequestClass;

/// Why a request bypassed the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    NonGet,
    CrossOrigin,
    DevPath,
    /// The worker is not active yet, so it does not control the page.
    Uncontrolled,
}

impl PassReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassReason::NonGet => "non-get",
            PassReason::CrossOrigin => "cross-origin",
            PassReason::DevPath => "dev-path",
            PassReason::Uncontrolled => "uncontrolled",
        }
    }
}

impl fmt::Display for PassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct InterceptRule {
    applies: fn(&RequestClass) -> bool,
    reason: PassReason,
}

fn non_get(class: &RequestClass) -> bool {
    !class.is_get
}

fn cross_origin(class: &RequestClass) -> bool {
    !class.same_origin
}

fn dev_path(class: &RequestClass) -> bool {
    class.dev_path
}

const INTERCEPT_RULES: &[InterceptRule] = &[
    InterceptRule { applies: non_get, reason: PassReason::NonGet },
    InterceptRule { applies: cross_origin, reason: PassReason::CrossOrigin },
    InterceptRule { applies: dev_path, reason: PassReason::DevPath },
];

/// `Some(reason)` when the request must go to the network untouched.
pub fn pass_through_reason(class: &RequestClass) -> Option<PassReason> {
    INTERCEPT_RULES.iter().find(|rule| (rule.applies)(class)).map(|rule| rule.reason)
}

/// Which fallback rule produced an offline response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackRule {
    /// A concurrent handler stored the entry after our miss.
    CachedEntry,
    NavigationShell,
    DynamicContent,
    RuntimeChunk,
    RouteShell,
    NetworkError,
}

impl FallbackRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackRule::CachedEntry => "cached-entry",
            FallbackRule::NavigationShell => "navigation-shell",
            FallbackRule::DynamicContent => "dynamic-content",
            FallbackRule::RuntimeChunk => "runtime-chunk",
            FallbackRule::RouteShell => "route-shell",
            FallbackRule::NetworkError => "network-error",
        }
    }
}

impl fmt::Display for FallbackRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the worker does when a fallback rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackAction {
    /// Look the request up again; fall through on a miss.
    RecheckCache,
    /// Serve the cached shell, or the built-in offline page without one.
    ShellOrOfflinePage,
    /// Serve the "not available offline" placeholder for the content kind.
    NotAvailable,
    /// Serve the cached shell; fall through when it is missing.
    ShellIfCached,
    NetworkError,
}

pub(crate) struct FallbackStep {
    pub rule: FallbackRule,
    pub applies: fn(&RequestClass) -> bool,
    pub action: FallbackAction,
}

fn always(_: &RequestClass) -> bool {
    true
}

fn navigation(class: &RequestClass) -> bool {
    class.navigation
}

fn dynamic_content(class: &RequestClass) -> bool {
    class.dynamic.is_some()
}

fn runtime_chunk(class: &RequestClass) -> bool {
    class.runtime_chunk
}

fn known_route(class: &RequestClass) -> bool {
    class.known_route
}

pub(crate) const FALLBACK_RULES: &[FallbackStep] = &[
    FallbackStep { rule: FallbackRule::CachedEntry, applies: always, action: FallbackAction::RecheckCache },
    FallbackStep {
        rule: FallbackRule::NavigationShell,
        applies: navigation,
        action: FallbackAction::ShellOrOfflinePage,
    },
    FallbackStep { rule: FallbackRule::DynamicContent, applies: dynamic_content, action: FallbackAction::NotAvailable },
    FallbackStep { rule: FallbackRule::RuntimeChunk, applies: runtime_chunk, action: FallbackAction::NetworkError },
    FallbackStep { rule: FallbackRule::RouteShell, applies: known_route, action: FallbackAction::ShellIfCached },
    FallbackStep { rule: FallbackRule::NetworkError, applies: always, action: FallbackAction::NetworkError },
];

/// Fallback steps that apply to a request, in evaluation order.
pub(crate) fn fallback_steps(class: &RequestClass) -> impl Iterator<Item = &'static FallbackStep> + '_ {
    FALLBACK_RULES.iter().filter(move |step| (step.applies)(class))
}

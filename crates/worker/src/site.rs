//! What the hosted app looks like from the interceptor's side: its data
//! files, page routes, dev-server paths and dynamic content patterns.

use std::sync::LazyLock;

use regex::Regex;

/// Data files the pages load at runtime.
pub const DATA_FILES: &[&str] = &[
    "/data/flights.json",
    "/data/stays.json",
    "/data/explore.json",
    "/data/dining.json",
    "/data/transport.json",
];

/// Top-level page routes.
pub const ROUTES: &[&str] = &["/", "/flights", "/stays", "/explore", "/dining", "/transport"];

/// Substrings that only appear in dev-server infrastructure requests.
pub const DEV_PATH_MARKERS: &[&str] =
    &["/@vite/", "/@fs/", "/@id/", "/node_modules/", "/.svelte-kit/", "/src/", "__vite_ping"];

/// Prefix of content-hashed runtime chunks emitted by the build.
pub const RUNTIME_CHUNK_PREFIX: &str = "/_app/immutable/";

/// Root document served for offline navigations.
pub const SHELL_PATH: &str = "/";

static ROUTE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"^/explore/[A-Za-z0-9_-]+/?$"]
        .into_iter()
        .map(|p| Regex::new(p).expect("route pattern is valid"))
        .collect()
});

static DYNAMIC_PATTERNS: LazyLock<Vec<(Regex, DynamicKind)>> = LazyLock::new(|| {
    [
        (r"^/descriptions/.+\.(?:md|txt)$", DynamicKind::Description),
        (r"(?i)\.(?:jpe?g|png|gif|webp|avif|svg)$", DynamicKind::Image),
        (r"(?i)\.(?:mp3|m4a|aac|ogg|wav)$", DynamicKind::Audio),
    ]
    .into_iter()
    .map(|(p, kind)| (Regex::new(p).expect("dynamic content pattern is valid"), kind))
    .collect()
});

/// Kind of content fetched on demand rather than pre-cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamicKind {
    Description,
    Image,
    Audio,
}

impl DynamicKind {
    /// Body of the placeholder served when this content is unreachable.
    pub fn offline_message(&self) -> &'static str {
        match self {
            DynamicKind::Description => "Description not available offline",
            DynamicKind::Image => "Image not available offline",
            DynamicKind::Audio => "Audio not available offline",
        }
    }
}

/// The application's routing and content layout.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub shell_path: String,
    pub data_files: Vec<String>,
    pub routes: Vec<String>,
    pub route_patterns: Vec<Regex>,
    pub dev_path_markers: Vec<String>,
    pub runtime_chunk_prefix: String,
    pub dynamic_patterns: Vec<(Regex, DynamicKind)>,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::lisbon()
    }
}

impl SiteProfile {
    /// Profile of the Lisbon trip app.
    pub fn lisbon() -> Self {
        Self {
            shell_path: SHELL_PATH.to_string(),
            data_files: DATA_FILES.iter().map(|s| s.to_string()).collect(),
            routes: ROUTES.iter().map(|s| s.to_string()).collect(),
            route_patterns: ROUTE_PATTERNS.clone(),
            dev_path_markers: DEV_PATH_MARKERS.iter().map(|s| s.to_string()).collect(),
            runtime_chunk_prefix: RUNTIME_CHUNK_PREFIX.to_string(),
            dynamic_patterns: DYNAMIC_PATTERNS.clone(),
        }
    }

    /// `path_and_query` is matched as a whole so markers in the query
    /// string (e.g. `?__vite_ping`) count too.
    pub fn is_dev_path(&self, path_and_query: &str) -> bool {
        self.dev_path_markers.iter().any(|m| path_and_query.contains(m.as_str()))
    }

    pub fn is_runtime_chunk(&self, path: &str) -> bool {
        path.starts_with(&self.runtime_chunk_prefix)
    }

    /// First dynamic content pattern the path matches.
    pub fn dynamic_kind(&self, path: &str) -> Option<DynamicKind> {
        self.dynamic_patterns
            .iter()
            .find(|(re, _)| re.is_match(path))
            .map(|(_, kind)| *kind)
    }

    /// Whether the path is a page the client-side router can render.
    pub fn is_route(&self, path: &str) -> bool {
        let trimmed = if path.len() > 1 { path.trim_end_matches('/') } else { path };
        self.routes.iter().any(|r| r == trimmed) || self.route_patterns.iter().any(|re| re.is_match(path))
    }
}

//! Build information and the install-time asset manifest.
//!
//! ### Manifest order
//!
//! Build artifacts, static files, extra assets, data files, then page
//! routes. Duplicates keep their first position.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use lisboa_core::{AppConfig, Error};

use crate::site::SiteProfile;

/// What the build step reports about one deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    /// Generation token; names the cache store.
    pub version: String,
    /// Hashed build artifacts.
    #[serde(default)]
    pub build: Vec<String>,
    /// Static files copied as-is.
    #[serde(default)]
    pub files: Vec<String>,
}

impl BuildInfo {
    /// Read a JSON build manifest file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidInput(format!("cannot read build manifest {}: {}", path.display(), e)))?;
        let info: BuildInfo = serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidInput(format!("invalid build manifest {}: {}", path.display(), e)))?;

        if info.version.trim().is_empty() {
            return Err(Error::InvalidInput(format!("build manifest {} has an empty version", path.display())));
        }
        Ok(info)
    }

    /// Build info from the manifest file when configured, else from the
    /// inline config lists.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        match &config.build_manifest {
            Some(path) => Self::load(path),
            None => Ok(Self {
                version: config.generation.clone(),
                build: config.build_assets.clone(),
                files: config.static_files.clone(),
            }),
        }
    }
}

/// Ordered, deduplicated same-origin paths fetched at install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    paths: Vec<String>,
}

impl AssetManifest {
    pub fn assemble(build: &BuildInfo, extra: &[String], site: &SiteProfile) -> Self {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();

        let sources = build
            .build
            .iter()
            .chain(&build.files)
            .chain(extra)
            .chain(&site.data_files)
            .chain(&site.routes);

        for raw in sources {
            let Some(path) = normalize_path(raw) else {
                continue;
            };
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }

        Self { paths }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Absolute URLs of every entry on `origin`.
    pub fn urls(&self, origin: &Url) -> Result<Vec<Url>, Error> {
        self.paths
            .iter()
            .map(|p| origin.join(p).map_err(|e| Error::InvalidUrl(format!("{}: {}", p, e))))
            .collect()
    }
}

/// Paths are rooted at the origin; blanks are dropped.
fn normalize_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('/') { Some(trimmed.to_string()) } else { Some(format!("/{}", trimmed)) }
}

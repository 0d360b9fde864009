//! The offline cache interceptor.
//!
//! ### Lifecycle
//!
//! - `install`: fetch every manifest asset; write them to the generation's
//!   store only when all succeeded. Failure leaves the worker `Redundant`.
//! - `activate`: delete every store but the current one, then take control.
//! - `boot`: resume a generation whose store already exists, else install
//!   and activate.
//!
//! ### Fetch handling
//!
//! Pass-through rules first, then cache-first with a bounded network fetch,
//! then the fallback table when the network fails.

use std::fmt;
use std::time::{Duration, Instant};

use futures_util::future::try_join_all;
use tokio::sync::RwLock;
use url::Url;

use lisboa_core::{AppConfig, CacheStorage, Error, Network, Request, Response};

use crate::classify::{RequestClass, classify};
use crate::fallback;
use crate::lifecycle::{Generation, WorkerState};
use crate::manifest::{AssetManifest, BuildInfo};
use crate::rules::{FallbackAction, FallbackRule, PassReason, fallback_steps, pass_through_reason};
use crate::site::SiteProfile;

/// Everything a worker needs to know about the deployment it serves.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub origin: Url,
    pub build: BuildInfo,
    pub extra_assets: Vec<String>,
    /// Deadline for one network fetch; a slower answer counts as offline.
    pub fetch_timeout: Duration,
    /// Largest body stored on a runtime miss. Bigger responses are served
    /// but not kept. Install ignores it.
    pub max_entry_bytes: usize,
    pub site: SiteProfile,
}

impl WorkerOptions {
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            origin,
            build: BuildInfo::from_config(config)?,
            extra_assets: config.extra_assets.clone(),
            fetch_timeout: config.timeout(),
            max_entry_bytes: config.max_bytes,
            site: SiteProfile::lisbon(),
        })
    }
}

/// Where a handled request's response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    PassThrough(PassReason),
    Cache,
    Network,
    Fallback(FallbackRule),
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSource::PassThrough(reason) => write!(f, "pass-through ({})", reason),
            ResponseSource::Cache => f.write_str("cache"),
            ResponseSource::Network => f.write_str("network"),
            ResponseSource::Fallback(rule) => write!(f, "fallback ({})", rule),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub response: Response,
    pub source: ResponseSource,
}

/// One worker generation over an injected cache and network.
pub struct Worker<C, N> {
    cache: C,
    network: N,
    options: WorkerOptions,
    generation: Generation,
    manifest: AssetManifest,
    state: RwLock<WorkerState>,
}

impl<C: CacheStorage, N: Network> Worker<C, N> {
    pub fn new(cache: C, network: N, options: WorkerOptions) -> Self {
        let generation = Generation::new(options.build.version.clone());
        let manifest = AssetManifest::assemble(&options.build, &options.extra_assets, &options.site);
        Self { cache, network, options, generation, manifest, state: RwLock::new(WorkerState::New) }
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    /// Name of the store this generation reads and writes.
    pub fn store_name(&self) -> String {
        self.generation.store_name()
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn options(&self) -> &WorkerOptions {
        &self.options
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn set_state(&self, state: WorkerState) {
        *self.state.write().await = state;
    }

    /// Move to `to` if the current state passes `allowed`, atomically.
    async fn transition(&self, allowed: impl Fn(WorkerState) -> bool, to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if !allowed(*state) {
            return Err(Error::InvalidState(format!("cannot move from {} to {}", *state, to)));
        }
        *state = to;
        Ok(())
    }

    /// Pre-cache the manifest. Returns the number of entries written.
    pub async fn install(&self) -> Result<usize, Error> {
        self.transition(|s| s.can_install(), WorkerState::Installing).await?;
        tracing::info!("installing generation {} ({} assets)", self.generation, self.manifest.paths().len());

        let start = Instant::now();
        match self.precache().await {
            Ok(count) => {
                self.set_state(WorkerState::Installed).await;
                tracing::info!(
                    "installed generation {} into {} in {}ms",
                    self.generation,
                    self.store_name(),
                    start.elapsed().as_millis()
                );
                Ok(count)
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant).await;
                tracing::warn!("install of generation {} failed: {}", self.generation, e);
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, Error> {
        let urls = self.manifest.urls(&self.options.origin)?;

        let fetches = urls.into_iter().map(move |url| async move {
            let request = Request::get(url.clone());
            let response = self
                .fetch_with_deadline(&request)
                .await
                .map_err(|e| Error::InstallFailed { url: url.to_string(), reason: e.to_string() })?;
            if !response.is_success() {
                return Err(Error::InstallFailed {
                    url: url.to_string(),
                    reason: format!("HTTP {} {}", response.status, response.status_text),
                });
            }
            Ok::<_, Error>((url, response))
        });
        let fetched = try_join_all(fetches).await?;

        self.cache.put_all(&self.store_name(), &fetched).await?;
        Ok(fetched.len())
    }

    /// Drop stale stores and take control. Returns the deleted store names.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        self.transition(|s| s == WorkerState::Installed, WorkerState::Activating).await?;

        match self.delete_stale_stores().await {
            Ok(deleted) => {
                self.set_state(WorkerState::Active).await;
                tracing::info!("generation {} active, removed {} stale stores", self.generation, deleted.len());
                Ok(deleted)
            }
            Err(e) => {
                self.set_state(WorkerState::Installed).await;
                Err(e)
            }
        }
    }

    async fn delete_stale_stores(&self) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for name in self.cache.keys().await? {
            if self.generation.owns(&name) {
                continue;
            }
            if self.cache.delete(&name).await? {
                tracing::debug!("deleted stale store {}", name);
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Bring the worker to `Active`, installing only when needed.
    ///
    /// Returns the stale stores removed on the way.
    pub async fn boot(&self) -> Result<Vec<String>, Error> {
        let state = self.state().await;
        let stored = self.cache.has(&self.store_name()).await?;
        match state {
            WorkerState::Active => return Ok(Vec::new()),
            WorkerState::Installed => {}
            WorkerState::New if stored => {
                tracing::info!("resuming installed generation {}", self.generation);
                self.transition(|s| s == WorkerState::New, WorkerState::Installed).await?;
            }
            _ => {
                self.install().await?;
            }
        }
        self.activate().await
    }

    /// Answer one request from the page.
    ///
    /// Network failures on intercepted requests are answered from the
    /// fallback table and never returned as `Err`. Every other error is.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        let class = classify(request, &self.options.origin, &self.options.site);

        let pass = if self.state().await.controls_clients() {
            pass_through_reason(&class)
        } else {
            Some(PassReason::Uncontrolled)
        };
        if let Some(reason) = pass {
            tracing::debug!("pass-through {} {} ({})", request.method, request.url, reason);
            let response = self.network.fetch(request).await?;
            return Ok(FetchOutcome { response, source: ResponseSource::PassThrough(reason) });
        }

        let store = self.store_name();
        if let Some(response) = self.cache.match_url(&store, &request.url).await? {
            tracing::debug!("cache hit {}", request.url);
            return Ok(FetchOutcome { response, source: ResponseSource::Cache });
        }

        match self.fetch_with_deadline(request).await {
            Ok(response) => {
                if !response.is_cacheable() {
                    tracing::debug!("not storing {} (HTTP {})", request.url, response.status);
                } else if response.body.len() > self.options.max_entry_bytes {
                    tracing::debug!("not storing {} ({} bytes)", request.url, response.body.len());
                } else if let Err(e) = self.cache.put(&store, &request.url, &response).await {
                    tracing::warn!("failed to store {}: {}", request.url, e);
                }
                Ok(FetchOutcome { response, source: ResponseSource::Network })
            }
            Err(e) if e.is_network_failure() => {
                tracing::warn!("network failed for {}: {}", request.url, e);
                self.fallback(request, &class).await
            }
            Err(e) => Err(e),
        }
    }

    async fn fallback(&self, request: &Request, class: &RequestClass) -> Result<FetchOutcome, Error> {
        let store = self.store_name();

        for step in fallback_steps(class) {
            let response = match step.action {
                FallbackAction::RecheckCache => self.cache.match_url(&store, &request.url).await?,
                FallbackAction::ShellOrOfflinePage => {
                    Some(self.cached_shell(&store).await?.unwrap_or_else(fallback::offline_page))
                }
                FallbackAction::NotAvailable => class.dynamic.map(fallback::not_available),
                FallbackAction::ShellIfCached => self.cached_shell(&store).await?,
                FallbackAction::NetworkError => Some(fallback::network_error()),
            };

            if let Some(response) = response {
                tracing::debug!("offline fallback {} for {}", step.rule, request.url);
                return Ok(FetchOutcome { response, source: ResponseSource::Fallback(step.rule) });
            }
        }

        Ok(FetchOutcome { response: fallback::network_error(), source: ResponseSource::Fallback(FallbackRule::NetworkError) })
    }

    async fn cached_shell(&self, store: &str) -> Result<Option<Response>, Error> {
        let shell = self
            .options
            .origin
            .join(&self.options.site.shell_path)
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        self.cache.match_url(store, &shell).await
    }

    async fn fetch_with_deadline(&self, request: &Request) -> Result<Response, Error> {
        let deadline = self.options.fetch_timeout;
        match tokio::time::timeout(deadline, self.network.fetch(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::FetchTimeout(format!(
                "{} did not answer within {}ms",
                request.url,
                deadline.as_millis()
            ))),
        }
    }
}

//! Scripted [`Network`] and [`CacheStorage`] doubles for worker tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use lisboa_core::{CacheStorage, Error, MemoryCache, Network, Request, Response, ResponseKind};

pub(crate) const ORIGIN: &str = "https://trip.example";

pub(crate) fn origin() -> Url {
    Url::parse(ORIGIN).unwrap()
}

pub(crate) fn url(path: &str) -> Url {
    origin().join(path).unwrap()
}

pub(crate) fn ok(body: &'static str, content_type: &str) -> Response {
    Response {
        status: 200,
        status_text: "OK".into(),
        kind: ResponseKind::Basic,
        url: None,
        headers: vec![("content-type".into(), content_type.into())],
        body: Bytes::from_static(body.as_bytes()),
    }
}

#[derive(Default)]
struct Script {
    routes: HashMap<String, Response>,
    offline: bool,
    hang: bool,
    broken: bool,
    race: Option<(MemoryCache, String)>,
    calls: Vec<String>,
}

/// Serves scripted responses keyed by absolute URL; anything unscripted is
/// a 404. Can be switched offline or made to never answer.
#[derive(Clone, Default)]
pub(crate) struct FakeNetwork {
    script: Arc<Mutex<Script>>,
}

impl FakeNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Network serving every page, data file and shell of the app.
    pub(crate) fn app() -> Self {
        let net = Self::new();
        net.serve("/", ok("<html>shell</html>", "text/html"));
        for route in crate::site::ROUTES.iter().skip(1) {
            net.serve(route, ok("<html>page</html>", "text/html"));
        }
        for data in crate::site::DATA_FILES {
            net.serve(data, ok(r#"{"items":[]}"#, "application/json"));
        }
        net
    }

    pub(crate) fn serve(&self, path: &str, response: Response) {
        self.serve_url(url(path).as_str(), response);
    }

    pub(crate) fn serve_url(&self, url: &str, mut response: Response) {
        response.url = Some(url.to_string());
        self.script.lock().unwrap().routes.insert(url.to_string(), response);
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.script.lock().unwrap().offline = offline;
    }

    pub(crate) fn set_hang(&self, hang: bool) {
        self.script.lock().unwrap().hang = hang;
    }

    /// Fail every fetch with an error that is not a network failure.
    pub(crate) fn set_broken(&self, broken: bool) {
        self.script.lock().unwrap().broken = broken;
    }

    /// While offline, write the scripted response into `store` before
    /// failing, as if another handler stored it during our fetch.
    pub(crate) fn race_into(&self, cache: MemoryCache, store: &str) {
        self.script.lock().unwrap().race = Some((cache, store.to_string()));
    }

    pub(crate) fn calls(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }

    pub(crate) fn calls_for(&self, path: &str) -> usize {
        let target = url(path).to_string();
        self.script.lock().unwrap().calls.iter().filter(|c| **c == target).count()
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let key = request.url.to_string();
        let (offline, hang, broken, race, scripted) = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(key.clone());
            (script.offline, script.hang, script.broken, script.race.clone(), script.routes.get(&key).cloned())
        };

        if hang {
            std::future::pending::<()>().await;
        }
        if broken {
            return Err(Error::InvalidInput(format!("{}: unsupported request", key)));
        }
        if offline {
            if let Some((cache, store)) = race
                && let Some(response) = &scripted
            {
                cache.put(&store, &request.url, response).await?;
            }
            return Err(Error::Network(format!("{}: connection refused", key)));
        }

        let mut response = scripted.unwrap_or_else(|| {
            let mut res = Response::synthesized(404, "Not Found", "text/plain", "not found");
            res.kind = ResponseKind::Basic;
            res.url = Some(key);
            res
        });
        if request.url.origin() != origin().origin() {
            response.kind = ResponseKind::Cors;
        }
        Ok(response)
    }
}

/// Cache whose next `failures` batch writes are rejected.
#[derive(Clone)]
pub(crate) struct FailingWrites {
    inner: MemoryCache,
    failures: Arc<AtomicUsize>,
}

impl FailingWrites {
    pub(crate) fn new(inner: MemoryCache, failures: usize) -> Self {
        Self { inner, failures: Arc::new(AtomicUsize::new(failures)) }
    }
}

#[async_trait]
impl CacheStorage for FailingWrites {
    async fn open(&self, store: &str) -> Result<(), Error> {
        self.inner.open(store).await
    }

    async fn has(&self, store: &str) -> Result<bool, Error> {
        self.inner.has(store).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.inner.keys().await
    }

    async fn delete(&self, store: &str) -> Result<bool, Error> {
        self.inner.delete(store).await
    }

    async fn match_url(&self, store: &str, url: &Url) -> Result<Option<Response>, Error> {
        self.inner.match_url(store, url).await
    }

    async fn put(&self, store: &str, url: &Url, response: &Response) -> Result<(), Error> {
        self.inner.put(store, url, response).await
    }

    async fn put_all(&self, store: &str, entries: &[(Url, Response)]) -> Result<(), Error> {
        let rejected =
            self.failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok();
        if rejected {
            return Err(Error::CorruptEntry(format!("{}: write rejected", store)));
        }
        self.inner.put_all(store, entries).await
    }

    async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        self.inner.entry_count(store).await
    }
}

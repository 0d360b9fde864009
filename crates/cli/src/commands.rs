//! Subcommand implementations.

use anyhow::{Context, Result};
use serde::Serialize;

use lisboa_client::fetch::resolve;
use lisboa_client::flights::FlightsEnvelope;
use lisboa_client::{FetchClient, FetchConfig, FlightClient, FlightConfig, FlightQuery};
use lisboa_core::{AppConfig, CacheDb, CacheStorage, Request};
use lisboa_worker::{AssetManifest, BuildInfo, Generation, SiteProfile, Worker, WorkerOptions};

type LiveWorker = Worker<CacheDb, FetchClient>;

async fn open_worker(config: &AppConfig) -> Result<LiveWorker> {
    let cache = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache database {}", config.db_path.display()))?;
    let network = FetchClient::new(FetchConfig::from_app_config(config)?)?;
    let options = WorkerOptions::from_config(config)?;
    Ok(Worker::new(cache, network, options))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn install(config: &AppConfig) -> Result<()> {
    let worker = open_worker(config).await?;
    let count = worker.install().await?;
    println!("installed {} assets for generation {} into {}", count, worker.generation(), worker.store_name());
    Ok(())
}

pub async fn activate(config: &AppConfig) -> Result<()> {
    let worker = open_worker(config).await?;
    for name in worker.boot().await? {
        println!("deleted {}", name);
    }
    println!("active: {}", worker.store_name());
    Ok(())
}

pub async fn fetch(
    config: &AppConfig,
    path: &str,
    navigate: bool,
    method: &str,
    headers: Vec<(String, String)>,
) -> Result<()> {
    let worker = open_worker(config).await?;
    worker.boot().await?;

    let url = resolve(&worker.options().origin, path)?;
    let request = (if navigate { Request::navigate(url) } else { Request::get(url) }).with_method(method);
    let request = headers.into_iter().fold(request, |req, (name, value)| req.with_header(name, value));

    let outcome = worker.handle_fetch(&request).await?;
    println!("{} {}", outcome.response.status, outcome.response.status_text);
    println!("source: {}", outcome.source);
    if let Some(content_type) = outcome.response.content_type() {
        println!("content-type: {}", content_type);
    }
    println!();
    println!("{}", outcome.response.text());
    Ok(())
}

#[derive(Serialize)]
struct StoreSummary {
    name: String,
    entries: u64,
    current: bool,
}

pub async fn caches(config: &AppConfig) -> Result<()> {
    let cache = CacheDb::open(&config.db_path).await?;
    let current = Generation::new(BuildInfo::from_config(config)?.version);

    let mut stores = Vec::new();
    for name in cache.keys().await? {
        let entries = cache.entry_count(&name).await?;
        stores.push(StoreSummary { current: current.owns(&name), name, entries });
    }
    print_json(&stores)
}

pub fn manifest(config: &AppConfig) -> Result<()> {
    let build = BuildInfo::from_config(config)?;
    let manifest = AssetManifest::assemble(&build, &config.extra_assets, &SiteProfile::lisbon());
    print_json(&manifest.paths())
}

pub async fn flight(config: &AppConfig, carrier: &str, number: &str, departure: &str) -> Result<()> {
    let client = FlightClient::new(FlightConfig::from_app_config(config)?)?;
    let flight = client.status(&FlightQuery::new(carrier, number, departure)).await?;
    print_json(&FlightsEnvelope { flights: vec![flight] })
}

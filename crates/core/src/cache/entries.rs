//! SQLite implementation of the response cache.
//!
//! Stores live in `cache_stores`; entries in `cache_entries` cascade away
//! with their store.

use async_trait::async_trait;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use url::Url;

use super::connection::CacheDb;
use super::hash::request_key;
use super::storage::CacheStorage;
use crate::Error;
use crate::http::{Response, ResponseKind};

const UPSERT_ENTRY: &str = "INSERT INTO cache_entries (
        store_name, key_hash, url, status, status_text, kind,
        response_url, headers_json, body, stored_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    ON CONFLICT(store_name, key_hash) DO UPDATE SET
        url = excluded.url,
        status = excluded.status,
        status_text = excluded.status_text,
        kind = excluded.kind,
        response_url = excluded.response_url,
        headers_json = excluded.headers_json,
        body = excluded.body,
        stored_at = excluded.stored_at";

/// Row shape read back from `cache_entries`.
struct EntryRow {
    status: u16,
    status_text: String,
    kind: String,
    response_url: Option<String>,
    headers_json: String,
    body: Vec<u8>,
}

impl TryFrom<EntryRow> for Response {
    type Error = Error;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let kind: ResponseKind = row.kind.parse().map_err(Error::CorruptEntry)?;
        let headers: Vec<(String, String)> = serde_json::from_str(&row.headers_json)?;
        Ok(Response {
            status: row.status,
            status_text: row.status_text,
            kind,
            url: row.response_url,
            headers,
            body: Bytes::from(row.body),
        })
    }
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, store: &str) -> Result<(), Error> {
        let store = store.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![store, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn has(&self, store: &str) -> Result<bool, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM cache_stores WHERE name = ?1)",
                    params![store],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, store: &str) -> Result<bool, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![store])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn match_url(&self, store: &str, url: &Url) -> Result<Option<Response>, Error> {
        let store = store.to_string();
        let key = request_key(url);
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, status_text, kind, response_url, headers_json, body
                     FROM cache_entries WHERE store_name = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key], |row| {
                    Ok(EntryRow {
                        status: row.get(0)?,
                        status_text: row.get(1)?,
                        kind: row.get(2)?,
                        response_url: row.get(3)?,
                        headers_json: row.get(4)?,
                        body: row.get(5)?,
                    })
                });

                match result {
                    Ok(row) => Ok(Some(Response::try_from(row)?)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, store: &str, url: &Url, response: &Response) -> Result<(), Error> {
        let store = store.to_string();
        let key = request_key(url);
        let url = url.to_string();
        let response = response.clone();
        let headers_json = serde_json::to_string(&response.headers)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![store, now],
                )?;
                tx.execute(
                    UPSERT_ENTRY,
                    params![
                        store,
                        key,
                        url,
                        response.status,
                        response.status_text,
                        response.kind.as_str(),
                        response.url,
                        headers_json,
                        response.body.as_ref(),
                        now,
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, store: &str, entries: &[(Url, Response)]) -> Result<(), Error> {
        let store = store.to_string();
        let rows = entries
            .iter()
            .map(|(url, response)| {
                let headers_json = serde_json::to_string(&response.headers)?;
                Ok((request_key(url), url.to_string(), response.clone(), headers_json))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let now = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![store, now],
                )?;
                {
                    let mut stmt = tx.prepare(UPSERT_ENTRY)?;
                    for (key, url, response, headers_json) in &rows {
                        stmt.execute(params![
                            store,
                            key,
                            url,
                            response.status,
                            response.status_text,
                            response.kind.as_str(),
                            response.url,
                            headers_json,
                            response.body.as_ref(),
                            now,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE store_name = ?1",
                    params![store],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::RETRY_AFTER;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{Result, ScienceError};

// ─── RateLimitedClient ────────────────────────────────────────────────────────

/// HTTP client shared by all concurrent fetches. Requests are spaced by
/// `min_interval`; 429 responses and transport errors are retried.
pub struct RateLimitedClient {
    client: reqwest::Client,
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
    max_retries: u32,
}

impl RateLimitedClient {
    pub fn new(min_interval: Duration, max_retries: u32, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
            max_retries,
        })
    }

    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(t) = *last {
            let elapsed = t.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// GET `url`. A 404 yields `Ok(None)`.
    pub async fn get(&self, url: &str) -> Result<Option<String>> {
        let mut attempt = 0u32;
        loop {
            self.wait_for_rate_limit().await;
            let resp = self.client.get(url).send().await;
            match resp {
                Ok(r) if r.status() == 429 => {
                    let wait = r
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    if attempt >= self.max_retries {
                        return Err(ScienceError::RateLimit(url.to_string(), wait));
                    }
                    sleep(Duration::from_secs(wait)).await;
                    attempt += 1;
                }
                Ok(r) if r.status() == 404 => return Ok(None),
                Ok(r) if !r.status().is_success() => {
                    let status = r.status().as_u16();
                    let body = r.text().await.unwrap_or_default();
                    return Err(ScienceError::ApiError(
                        url.to_string(),
                        format!("HTTP {status}: {body}"),
                    ));
                }
                Ok(r) => return r.text().await.map(Some).map_err(ScienceError::Http),
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(ScienceError::Http(e));
                    }
                    let backoff = 2u64.pow(attempt);
                    sleep(Duration::from_secs(backoff)).await;
                    attempt += 1;
                }
            }
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        match self.get(url).await? {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| ScienceError::Parse(e.to_string())),
            None => Ok(None),
        }
    }
}

// ─── DiskCache ────────────────────────────────────────────────────────────────

/// JSON-file key/value store with a time-to-live. Entries are only ever
/// invalidated by age or by [`DiskCache::clear`].
pub struct DiskCache {
    dir: PathBuf,
    ttl: Duration,
}

fn cache_key_to_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{:x}.json", Sha256::digest(key.as_bytes())))
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[derive(Serialize, serde::Deserialize)]
struct CacheEntry<T> {
    stored_at: u64, // Unix timestamp secs
    key: String,
    value: T,
}

impl DiskCache {
    /// Cache rooted at `dir`; the directory is created if needed.
    pub fn in_dir(dir: impl Into<PathBuf>, ttl: Duration) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| ScienceError::Cache(format!("{}: {e}", dir.display())))?;
        Ok(Self { dir, ttl })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = cache_key_to_path(&self.dir, key);
        let data = tokio::fs::read(&path).await.ok()?;
        let entry: CacheEntry<T> = serde_json::from_slice(&data).ok()?;
        if entry.key != key {
            return None;
        }
        if unix_now().saturating_sub(entry.stored_at) > self.ttl.as_secs() {
            let _ = tokio::fs::remove_file(&path).await;
            return None;
        }
        Some(entry.value)
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        let path = cache_key_to_path(&self.dir, key);
        let entry = CacheEntry {
            stored_at: unix_now(),
            key: key.to_string(),
            value,
        };
        match serde_json::to_vec(&entry) {
            Ok(data) => {
                if let Err(e) = tokio::fs::write(&path, data).await {
                    tracing::debug!("cache write failed for {key}: {e}");
                }
            }
            Err(e) => tracing::debug!("cache serialization failed for {key}: {e}"),
        }
    }

    /// Remove every entry. Returns the number of files deleted.
    pub async fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| ScienceError::Cache(e.to_string()))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ScienceError::Cache(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && tokio::fs::remove_file(&path).await.is_ok()
            {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

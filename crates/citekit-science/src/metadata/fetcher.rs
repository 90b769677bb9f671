use std::sync::Arc;

use async_trait::async_trait;
use citekit_core::CanonicalMetadata;
use tracing::{debug, warn};

use crate::http::DiskCache;
use crate::identifiers::doi::normalize_doi;
use crate::metadata::normalize::canonical_from_work;
use crate::sources::MetadataSource;

/// Single-DOI metadata lookup. Failures of any kind collapse to `None`.
#[async_trait]
pub trait FetchMetadata: Send + Sync {
    async fn fetch_one(&self, doi: &str) -> Option<CanonicalMetadata>;
}

/// Fetches directly from a [`MetadataSource`] and normalizes the record.
pub struct SourceFetcher {
    source: Arc<dyn MetadataSource>,
}

impl SourceFetcher {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl FetchMetadata for SourceFetcher {
    async fn fetch_one(&self, doi: &str) -> Option<CanonicalMetadata> {
        match self.source.fetch_work(doi).await {
            Ok(Some(work)) => Some(canonical_from_work(&work, doi)),
            Ok(None) => {
                debug!("{}: no record for {doi}", self.source.name());
                None
            }
            Err(e) => {
                warn!("{}: metadata fetch failed for {doi}: {e}", self.source.name());
                None
            }
        }
    }
}

/// Consults a TTL disk cache before delegating to the wrapped fetcher.
pub struct CachedFetcher<F> {
    inner: F,
    cache: DiskCache,
}

impl<F: FetchMetadata> CachedFetcher<F> {
    pub fn new(inner: F, cache: DiskCache) -> Self {
        Self { inner, cache }
    }

    fn key(doi: &str) -> String {
        format!("doi:{}", normalize_doi(doi))
    }
}

#[async_trait]
impl<F: FetchMetadata> FetchMetadata for CachedFetcher<F> {
    async fn fetch_one(&self, doi: &str) -> Option<CanonicalMetadata> {
        let key = Self::key(doi);
        if let Some(mut cached) = self.cache.get::<CanonicalMetadata>(&key).await {
            debug!("cache hit for {doi}");
            // The record is shared across DOI spellings; keep the caller's.
            cached.doi = doi.to_string();
            return Some(cached);
        }

        let fetched = self.inner.fetch_one(doi).await?;
        self.cache.set(&key, &fetched).await;
        Some(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ScienceError};
    use crate::sources::crossref::{CrossRefAuthor, CrossRefWork};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    struct StaticSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl MetadataSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch_work(&self, doi: &str) -> Result<Option<CrossRefWork>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ScienceError::ApiError("static".into(), "HTTP 503".into()));
            }
            Ok(Some(CrossRefWork {
                doi: doi.to_string(),
                title: vec!["Cached Title".to_string()],
                author: vec![CrossRefAuthor {
                    given: Some("Ann".to_string()),
                    family: Some("LEE".to_string()),
                    name: None,
                }],
                ..Default::default()
            }))
        }

        async fn search_bibliographic(&self, _query: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn source_errors_become_none() {
        let source = Arc::new(StaticSource {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let fetcher = SourceFetcher::new(source);
        assert!(fetcher.fetch_one("10.1/x").await.is_none());
    }

    #[tokio::test]
    async fn cache_serves_repeat_lookups_across_spellings() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(StaticSource {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let cache = DiskCache::in_dir(dir.path(), Duration::from_secs(3600)).unwrap();
        let fetcher = CachedFetcher::new(SourceFetcher::new(source.clone()), cache);

        let first = fetcher.fetch_one("10.1/ABC").await.unwrap();
        let second = fetcher.fetch_one("doi:10.1/abc").await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.authors[0].family, "Lee");
        assert_eq!(second.title, first.title);
        assert_eq!(second.doi, "doi:10.1/abc");
    }

    #[tokio::test]
    async fn failed_lookups_are_not_cached() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(StaticSource {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let cache = DiskCache::in_dir(dir.path(), Duration::from_secs(3600)).unwrap();
        let fetcher = CachedFetcher::new(SourceFetcher::new(source.clone()), cache);

        assert!(fetcher.fetch_one("10.1/x").await.is_none());
        assert!(fetcher.fetch_one("10.1/x").await.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}

use citekit_core::CanonicalMetadata;
use citekit_core::config::MetadataConfig;
use futures::StreamExt;
use tracing::info;

use crate::metadata::fetcher::FetchMetadata;

/// Worker-pool sizes for the two fetch passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub concurrency: usize,
    pub retry_concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 3,
            retry_concurrency: 2,
        }
    }
}

impl From<&MetadataConfig> for BatchOptions {
    fn from(config: &MetadataConfig) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            retry_concurrency: config.retry_concurrency.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub retry: bool,
}

/// Fetch `dois[i]` for every `i` in `indices` with at most `workers` requests
/// in flight. `on_item` is called in completion order, not index order.
pub async fn fetch_pass<F>(
    fetcher: &dyn FetchMetadata,
    dois: &[String],
    indices: &[usize],
    workers: usize,
    mut on_item: F,
) where
    F: FnMut(usize, Option<CanonicalMetadata>),
{
    let mut stream = futures::stream::iter(indices.iter().copied().filter(|&i| i < dois.len()))
        .map(|i| async move { (i, fetcher.fetch_one(&dois[i]).await) })
        .buffer_unordered(workers.max(1));

    while let Some((i, metadata)) = stream.next().await {
        on_item(i, metadata);
    }
}

/// Indices whose fetch produced nothing.
pub fn failed_indices(results: &[Option<CanonicalMetadata>]) -> Vec<usize> {
    results
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.is_none().then_some(i))
        .collect()
}

/// Two-phase batch fetch. Results keep the order of `dois`; entries still
/// missing after the retry pass stay `None`.
pub async fn fetch_batch<P>(
    fetcher: &dyn FetchMetadata,
    dois: &[String],
    options: BatchOptions,
    mut on_progress: P,
) -> Vec<Option<CanonicalMetadata>>
where
    P: FnMut(BatchProgress),
{
    let total = dois.len();
    let mut results: Vec<Option<CanonicalMetadata>> = vec![None; total];
    if total == 0 {
        return results;
    }

    let all: Vec<usize> = (0..total).collect();
    let mut completed = 0;
    fetch_pass(fetcher, dois, &all, options.concurrency, |i, metadata| {
        results[i] = metadata;
        completed += 1;
        on_progress(BatchProgress {
            completed,
            total,
            retry: false,
        });
    })
    .await;

    let failed = failed_indices(&results);
    if failed.is_empty() {
        return results;
    }

    info!("retrying {} of {total} metadata lookups", failed.len());
    on_progress(BatchProgress {
        completed: total - failed.len(),
        total,
        retry: true,
    });

    fetch_pass(fetcher, dois, &failed, options.retry_concurrency, |i, metadata| {
        results[i] = metadata;
        let succeeded = results.iter().filter(|r| r.is_some()).count();
        on_progress(BatchProgress {
            completed: succeeded,
            total,
            retry: true,
        });
    })
    .await;

    let still_missing = failed_indices(&results).len();
    info!("metadata batch done: {} of {total} resolved", total - still_missing);
    results
}

pub mod batch;
pub mod fetcher;
pub mod normalize;

pub use batch::{BatchOptions, BatchProgress, failed_indices, fetch_batch, fetch_pass};
pub use fetcher::{CachedFetcher, FetchMetadata, SourceFetcher};
pub use normalize::{canonical_from_work, clean_text, normalize_name};

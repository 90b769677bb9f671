use async_trait::async_trait;

use crate::error::Result;

pub mod crossref;

pub use crossref::{CrossRefAuthor, CrossRefSource, CrossRefWork};

/// A scholarly-metadata service: lookup by DOI plus a free-text
/// bibliographic search used to recover missing DOIs.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when the service has no record for `doi`.
    async fn fetch_work(&self, doi: &str) -> Result<Option<CrossRefWork>>;

    /// DOI of the most relevant match for a bibliographic query.
    async fn search_bibliographic(&self, query: &str) -> Result<Option<String>>;
}

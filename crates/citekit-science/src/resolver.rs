use std::sync::Arc;

use tracing::{debug, warn};

use crate::identifiers::extract::{find_doi_in_text, is_section_header, strip_doi_tokens};
use crate::sources::MetadataSource;

/// Default minimum length of a bibliographic search query.
pub const MIN_QUERY_CHARS: usize = 30;

/// Finds the DOI of a raw reference string.
///
/// Direct DOI tokens win; otherwise the reference text is sent as a
/// bibliographic search. Section headers never reach the network.
pub struct DoiResolver {
    source: Arc<dyn MetadataSource>,
    min_query_chars: usize,
}

impl DoiResolver {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self {
            source,
            min_query_chars: MIN_QUERY_CHARS,
        }
    }

    pub fn with_min_query_chars(mut self, min_query_chars: usize) -> Self {
        self.min_query_chars = min_query_chars;
        self
    }

    /// Never fails: search errors are logged and treated as "not found".
    pub async fn resolve(&self, reference: &str) -> Option<String> {
        if is_section_header(reference) {
            return None;
        }
        if let Some(doi) = find_doi_in_text(reference) {
            return Some(doi);
        }

        let query = strip_doi_tokens(reference);
        if query.chars().count() < self.min_query_chars {
            debug!("reference too short for a bibliographic search: {query:?}");
            return None;
        }

        match self.source.search_bibliographic(&query).await {
            Ok(found) => {
                if let Some(doi) = &found {
                    debug!("{} matched {doi} for {query:?}", self.source.name());
                }
                found
            }
            Err(e) => {
                warn!("{}: bibliographic search failed: {e}", self.source.name());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ScienceError};
    use crate::sources::CrossRefWork;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SearchOnly {
        answer: Option<String>,
        fail: bool,
        searches: AtomicUsize,
    }

    impl SearchOnly {
        fn new(answer: Option<&str>, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                answer: answer.map(str::to_string),
                fail,
                searches: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl MetadataSource for SearchOnly {
        fn name(&self) -> &str {
            "search-only"
        }

        async fn fetch_work(&self, _doi: &str) -> Result<Option<CrossRefWork>> {
            Ok(None)
        }

        async fn search_bibliographic(&self, _query: &str) -> Result<Option<String>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ScienceError::ApiError("search".into(), "HTTP 500".into()));
            }
            Ok(self.answer.clone())
        }
    }

    const LONG_REFERENCE: &str = "Smith J, Doe A. Some Title About Catalysis. J. Chem. 2020;15(3):122-128.";

    #[tokio::test]
    async fn headers_never_hit_the_network() {
        let source = SearchOnly::new(Some("10.1/should-not-appear"), false);
        let resolver = DoiResolver::new(source.clone()).with_min_query_chars(0);
        for header in ["REFERENCES", "Bibliography", "chapter 4", "WORKS CITED"] {
            assert_eq!(resolver.resolve(header).await, None);
        }
        assert_eq!(source.searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn direct_tokens_skip_the_search() {
        let source = SearchOnly::new(Some("10.9/other"), false);
        let resolver = DoiResolver::new(source.clone());
        for text in [
            "Title. https://doi.org/10.1000/xyz.",
            "Title. doi:10.1000/xyz",
            "Title. DOI:10.1000/xyz;",
            "Title. 10.1000/xyz,",
        ] {
            assert_eq!(resolver.resolve(text).await.as_deref(), Some("10.1000/xyz"));
        }
        assert_eq!(source.searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_back_to_bibliographic_search() {
        let source = SearchOnly::new(Some("10.1000/found"), false);
        let resolver = DoiResolver::new(source.clone());
        assert_eq!(resolver.resolve(LONG_REFERENCE).await.as_deref(), Some("10.1000/found"));
        assert_eq!(source.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn short_fragments_are_not_searched() {
        let source = SearchOnly::new(Some("10.1000/found"), false);
        let resolver = DoiResolver::new(source.clone());
        assert_eq!(resolver.resolve("Smith J. Short.").await, None);
        assert_eq!(source.searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn search_errors_become_not_found() {
        let source = SearchOnly::new(None, true);
        let resolver = DoiResolver::new(source.clone());
        assert_eq!(resolver.resolve(LONG_REFERENCE).await, None);
        assert_eq!(source.searches.load(Ordering::SeqCst), 1);
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use citekit_core::{AppConfig, FormattedReference, Language, StyleConfig};
use serde::Serialize;
use tracing::{debug, info};

use crate::abbreviation::AbbreviationTable;
use crate::dedup::{DuplicateMap, find_duplicates};
use crate::error::Result;
use crate::format::{FormatContext, format_reference, formatter_for};
use crate::http::DiskCache;
use crate::identifiers::extract::is_section_header;
use crate::metadata::{BatchOptions, CachedFetcher, FetchMetadata, SourceFetcher, fetch_batch};
use crate::resolver::DoiResolver;
use crate::sources::{CrossRefSource, MetadataSource};

// ─── Progress ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    Resolving,
    ExtractingMetadata,
    RetryingFailed,
    CheckingDuplicates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: ProgressPhase,
    pub completed: usize,
    pub total: usize,
}

// ─── Run inputs / outputs ───────────────────────────────────────────────────

/// Per-run settings that are not part of the citation style.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub language: Language,
    /// Render flat preview strings instead of styled runs.
    pub preview: bool,
}

/// Result of one batch run, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub references: Vec<FormattedReference>,
    pub doi_found: usize,
    pub doi_not_found: usize,
    pub duplicates: DuplicateMap,
    /// One line per raw reference for the plain-text DOI export.
    pub doi_list: Vec<String>,
}

enum Slot {
    Header(String),
    Unresolved(String),
    Resolved {
        original: String,
        doi: String,
        list_index: usize,
    },
}

// ─── Processor ──────────────────────────────────────────────────────────────

/// Resolves, fetches, formats and deduplicates a list of raw references.
pub struct ReferenceBatchProcessor {
    resolver: DoiResolver,
    fetcher: Arc<dyn FetchMetadata>,
    abbreviations: Arc<AbbreviationTable>,
    options: BatchOptions,
}

impl ReferenceBatchProcessor {
    pub fn new(
        resolver: DoiResolver,
        fetcher: Arc<dyn FetchMetadata>,
        abbreviations: Arc<AbbreviationTable>,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            abbreviations,
            options: BatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Crossref-backed processor. The disk cache sits in front of the
    /// fetcher unless it is disabled in `config` or `use_cache` is false.
    pub fn from_config(config: &AppConfig, use_cache: bool) -> Result<Self> {
        let source: Arc<dyn MetadataSource> = Arc::new(CrossRefSource::from_config(&config.metadata)?);
        let resolver =
            DoiResolver::new(source.clone()).with_min_query_chars(config.metadata.min_query_chars);

        let direct = SourceFetcher::new(source);
        let fetcher: Arc<dyn FetchMetadata> = if use_cache && config.cache.enabled {
            let cache = DiskCache::in_dir(config.cache_dir(), config.cache_ttl())?;
            Arc::new(CachedFetcher::new(direct, cache))
        } else {
            Arc::new(direct)
        };

        let abbreviations = Arc::new(AbbreviationTable::from_config(&config.abbreviation));
        Ok(Self::new(resolver, fetcher, abbreviations).with_options(BatchOptions::from(&config.metadata)))
    }

    pub fn abbreviations(&self) -> &Arc<AbbreviationTable> {
        &self.abbreviations
    }

    /// Process `references` with `style`.
    ///
    /// Only an invalid style is an error; every per-reference failure ends up
    /// as an annotated entry and the batch always runs to completion.
    pub async fn process<P>(
        &self,
        references: &[String],
        style: &StyleConfig,
        run: RunOptions,
        mut on_progress: P,
    ) -> Result<BatchOutcome>
    where
        P: FnMut(ProgressEvent),
    {
        let ctx = FormatContext::new(self.abbreviations.clone(), run.language);
        let formatter = formatter_for(style, &ctx)?;
        let labels = run.language.labels();
        let total = references.len();

        // Resolution runs sequentially: it may hit the search endpoint.
        let mut slots = Vec::with_capacity(total);
        let mut doi_list = Vec::with_capacity(total);
        for (i, reference) in references.iter().enumerate() {
            let slot = if is_section_header(reference) {
                doi_list.push(format!("{reference} {}", labels.section_header_skipped));
                Slot::Header(reference.clone())
            } else {
                match self.resolver.resolve(reference).await {
                    Some(doi) => {
                        debug!("reference {} -> {doi}", i + 1);
                        doi_list.push(doi.clone());
                        Slot::Resolved {
                            original: reference.clone(),
                            doi,
                            list_index: doi_list.len() - 1,
                        }
                    }
                    None => {
                        doi_list.push(format!("{reference}\n{}", labels.insert_doi_manually));
                        Slot::Unresolved(reference.clone())
                    }
                }
            };
            slots.push(slot);
            on_progress(ProgressEvent {
                phase: ProgressPhase::Resolving,
                completed: i + 1,
                total,
            });
        }

        // Each distinct DOI string is fetched once.
        let mut unique = Vec::new();
        let mut position: HashMap<String, usize> = HashMap::new();
        for slot in &slots {
            if let Slot::Resolved { doi, .. } = slot {
                position.entry(doi.clone()).or_insert_with(|| {
                    unique.push(doi.clone());
                    unique.len() - 1
                });
            }
        }

        let fetched = fetch_batch(self.fetcher.as_ref(), &unique, self.options, |p| {
            on_progress(ProgressEvent {
                phase: if p.retry {
                    ProgressPhase::RetryingFailed
                } else {
                    ProgressPhase::ExtractingMetadata
                },
                completed: p.completed,
                total: p.total,
            })
        })
        .await;

        let mut doi_found = 0;
        let mut doi_not_found = 0;
        let mut formatted = Vec::with_capacity(total);
        for slot in slots {
            let entry = match slot {
                Slot::Header(text) => FormattedReference::SectionHeader { text },
                Slot::Unresolved(original) => {
                    doi_not_found += 1;
                    FormattedReference::Error {
                        message: format!("{original} {}", labels.doi_not_found),
                        original,
                    }
                }
                Slot::Resolved {
                    original,
                    doi,
                    list_index,
                } => {
                    let metadata = position.get(&doi).and_then(|&p| fetched[p].clone());
                    match metadata {
                        None => {
                            doi_not_found += 1;
                            doi_list[list_index] = format!("{doi}\n{}", labels.insert_doi_manually);
                            FormattedReference::Error {
                                message: format!("{original} {}", labels.metadata_unavailable),
                                original,
                            }
                        }
                        Some(metadata) => {
                            let (rendered, failed) =
                                format_reference(formatter.as_ref(), Some(&metadata), run.preview, labels);
                            if failed {
                                doi_not_found += 1;
                                FormattedReference::Error {
                                    message: format!("{original} {}", labels.could_not_format),
                                    original,
                                }
                            } else {
                                doi_found += 1;
                                FormattedReference::Formatted { rendered, metadata }
                            }
                        }
                    }
                }
            };
            formatted.push(entry);
        }

        on_progress(ProgressEvent {
            phase: ProgressPhase::CheckingDuplicates,
            completed: 0,
            total: formatted.len(),
        });
        let duplicates = find_duplicates(&formatted);

        info!(
            "{} references: {doi_found} formatted with {}, {doi_not_found} need attention, {} duplicates",
            total,
            formatter.name(),
            duplicates.len()
        );

        Ok(BatchOutcome {
            references: formatted,
            doi_found,
            doi_not_found,
            duplicates,
            doi_list,
        })
    }
}

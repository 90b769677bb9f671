//! citekit engine: DOI discovery, Crossref metadata, journal abbreviation,
//! citation formatting, duplicate detection and bibliography statistics.

pub mod abbreviation;
pub mod dedup;
pub mod error;
pub mod format;
pub mod http;
pub mod identifiers;
pub mod input;
pub mod metadata;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod sources;
pub mod stats;

pub use abbreviation::AbbreviationTable;
pub use dedup::{DuplicateMap, find_duplicates, fingerprint};
pub use error::{Result, ScienceError};
pub use format::{CitationFormatter, FormatContext, format_reference, formatter_for};
pub use pipeline::{BatchOutcome, ProgressEvent, ProgressPhase, ReferenceBatchProcessor, RunOptions};
pub use resolver::DoiResolver;
pub use stats::{compute_statistics, compute_statistics_now};

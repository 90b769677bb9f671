use serde::{Deserialize, Serialize};

use crate::models::metadata::CanonicalMetadata;

/// One contiguous piece of citation text with its emphasis and hyperlink flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub bold: bool,
    /// Text emitted after this run. On the last run this is either empty or
    /// the final punctuation.
    #[serde(default)]
    pub separator: String,
    #[serde(default)]
    pub is_doi_hyperlink: bool,
    /// DOI the hyperlink points at (`https://doi.org/<doi>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

impl StyledRun {
    pub fn plain(text: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            separator: separator.into(),
            ..Default::default()
        }
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_emphasis(mut self, italic: bool, bold: bool) -> Self {
        self.italic = italic;
        self.bold = bold;
        self
    }

    pub fn doi_link(text: impl Into<String>, doi: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_doi_hyperlink: true,
            doi: Some(doi.into()),
            ..Default::default()
        }
    }

    pub fn hyperlink_target(&self) -> Option<String> {
        match (&self.doi, self.is_doi_hyperlink) {
            (Some(doi), true) => Some(format!("https://doi.org/{doi}")),
            _ => None,
        }
    }
}

/// Concatenate runs with their separators into one plain string.
pub fn runs_to_plain_text(runs: &[StyledRun]) -> String {
    let mut out = String::new();
    for run in runs {
        out.push_str(&run.text);
        out.push_str(&run.separator);
    }
    out
}

/// A formatter's output: a flat preview string or the run sequence for rich writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Rendered {
    Preview(String),
    Runs(Vec<StyledRun>),
}

impl Rendered {
    pub fn plain_text(&self) -> String {
        match self {
            Self::Preview(text) => text.clone(),
            Self::Runs(runs) => runs_to_plain_text(runs),
        }
    }
}

/// One entry of a processed bibliography, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormattedReference {
    /// Successfully resolved and rendered.
    Formatted {
        rendered: Rendered,
        metadata: CanonicalMetadata,
    },
    /// Flagged for manual review.
    Error { original: String, message: String },
    /// A section heading passed through untouched.
    SectionHeader { text: String },
}

impl FormattedReference {
    pub fn metadata(&self) -> Option<&CanonicalMetadata> {
        match self {
            Self::Formatted { metadata, .. } => Some(metadata),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn plain_text(&self) -> String {
        match self {
            Self::Formatted { rendered, .. } => rendered.plain_text(),
            Self::Error { message, .. } => message.clone(),
            Self::SectionHeader { text } => text.clone(),
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    pub given: String,
    /// Name-cased: each hyphen/apostrophe-joined part starts upper-case.
    pub family: String,
}

impl Author {
    pub fn new(given: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            given: given.into(),
            family: family.into(),
        }
    }

    /// Up to two initials taken from the given names.
    ///
    /// The first initial keeps its case, the second is upper-cased.
    pub fn initials(&self) -> (String, String) {
        let mut parts = self.given.split_whitespace();
        let first = parts
            .next()
            .and_then(|p| p.chars().next())
            .map(String::from)
            .unwrap_or_default();
        let second = parts
            .next()
            .and_then(|p| p.chars().next())
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_default();
        (first, second)
    }

    /// `I.I.` or `I.` initials.
    pub fn dotted_initials(&self) -> String {
        let (first, second) = self.initials();
        if second.is_empty() {
            format!("{first}.")
        } else {
            format!("{first}.{second}.")
        }
    }
}

/// Normalized, per-DOI bibliographic record shared by all formatters.
///
/// Built once per DOI and never mutated afterwards; two references with the
/// same DOI share an identical record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalMetadata {
    pub authors: Vec<Author>,
    pub title: String,
    /// Full journal name as delivered by the metadata service.
    pub journal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub issue: String,
    /// Raw `start-end` range or a single page.
    #[serde(default)]
    pub pages: String,
    #[serde(default)]
    pub article_number: String,
    /// The DOI string the record was resolved from.
    pub doi: String,
}

impl CanonicalMetadata {
    pub fn year_text(&self) -> String {
        self.year.map(|y| y.to_string()).unwrap_or_default()
    }
}

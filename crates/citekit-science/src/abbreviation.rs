use std::collections::HashMap;
use std::path::Path;

use citekit_core::JournalStyle;
use citekit_core::config::AbbreviationConfig;
use tracing::{debug, warn};

use crate::format::collapse_periods;

const BUNDLED_TABLE: &str = include_str!("../data/ltwa_starter.tsv");

const STOP_WORDS: &[&str] = &["a", "an", "the", "of", "in", "and", "&"];

/// Always upper-cased when they open a journal name.
const ACRONYMS: &[&str] = &["acs", "ecs", "rsc", "ieee", "iet", "acm", "aims", "bmc", "bmj", "npj"];

/// Word → abbreviation table in the ISO 4 / LTWA spirit.
///
/// A `None` abbreviation means the word is dropped from the abbreviated
/// name. Stem entries (written `chem-` in the table file) match any word
/// that starts with the stem; the longest matching stem wins.
#[derive(Debug, Clone, Default)]
pub struct AbbreviationTable {
    exact: HashMap<String, Option<String>>,
    stems: Vec<(String, Option<String>)>,
}

impl AbbreviationTable {
    /// Parse tab-separated `word<TAB>abbreviation` rows. The first line is a header.
    pub fn from_tsv_str(data: &str) -> Self {
        let mut exact = HashMap::new();
        let mut stems = Vec::new();

        for line in data.lines().skip(1) {
            let Some((word, abbr)) = line.split_once('\t') else {
                continue;
            };
            let word = word.trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            let abbr = Some(abbr.trim().to_string()).filter(|a| !a.is_empty());
            match word.strip_suffix('-') {
                Some(stem) if !stem.is_empty() => stems.push((stem.to_string(), abbr)),
                _ => {
                    exact.insert(word, abbr);
                }
            }
        }

        stems.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        Self { exact, stems }
    }

    /// Load a table file. An unreadable file yields an empty table.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => {
                let table = Self::from_tsv_str(&data);
                debug!("loaded {} abbreviation entries from {}", table.len(), path.display());
                table
            }
            Err(e) => {
                warn!(
                    "abbreviation table {} unavailable ({e}); journal names will not be abbreviated",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// The starter table shipped with the crate.
    pub fn bundled() -> Self {
        Self::from_tsv_str(BUNDLED_TABLE)
    }

    pub fn from_config(config: &AbbreviationConfig) -> Self {
        match &config.table_path {
            Some(path) => Self::load(Path::new(path)),
            None => Self::bundled(),
        }
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.stems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `None` when the table says to drop the word.
    fn abbreviate_word(&self, word: &str) -> Option<String> {
        let lower = word.to_lowercase();
        if let Some(abbr) = self.exact.get(&lower) {
            return abbr.clone();
        }
        for (stem, abbr) in &self.stems {
            if lower.starts_with(stem.as_str()) {
                return abbr.clone();
            }
        }
        Some(lower)
    }

    pub fn abbreviate(&self, journal: &str, style: JournalStyle) -> String {
        if journal.is_empty() || style == JournalStyle::Full {
            return journal.to_string();
        }

        let words: Vec<String> = journal
            .split_whitespace()
            .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
            .map(|w| w.replace(':', ""))
            .filter(|w| !w.is_empty())
            .collect();
        if words.len() <= 1 {
            return journal.to_string();
        }

        let mut abbreviated = Vec::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            let Some(mut abbr) = self.abbreviate_word(word) else {
                continue;
            };
            if word.chars().next().is_some_and(char::is_uppercase) {
                abbr = capitalize_first(&abbr);
            }
            if i == 0 && ACRONYMS.contains(&abbr.to_lowercase().as_str()) {
                abbr = abbr.to_uppercase();
            }
            abbreviated.push(abbr);
        }

        let joined = match style {
            JournalStyle::AbbreviatedNoDots => abbreviated
                .iter()
                .map(|w| w.replace('.', ""))
                .collect::<Vec<_>>()
                .join(" "),
            _ => abbreviated.join(" "),
        };
        if joined.trim().is_empty() {
            return journal.to_string();
        }
        collapse_periods(&joined)
    }
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

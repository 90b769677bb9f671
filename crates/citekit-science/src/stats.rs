use std::collections::{HashMap, HashSet};

use chrono::Datelike;
use citekit_core::{AuthorStat, CanonicalMetadata, FormattedReference, JournalStat, Statistics, YearStat};

use crate::identifiers::doi::normalize_doi;

const TOP_N: usize = 20;
const OLDEST_REPORTED_YEAR: i32 = 2010;
const RECENT_YEARS: i32 = 4;
const RECENT_SHARE_MIN: f64 = 20.0;
const AUTHOR_SHARE_MAX: f64 = 30.0;

/// Counts in first-seen order; sorting keeps ties in that order.
#[derive(Default)]
struct Tally {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Tally {
    fn add(&mut self, key: String) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    fn top(mut self, n: usize) -> Vec<(String, usize)> {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries.truncate(n);
        self.entries
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// `Family I.`, or the bare family name without a given name.
fn author_label(family: &str, given: &str) -> String {
    match given.chars().next() {
        Some(initial) => format!("{family} {initial}."),
        None => family.to_string(),
    }
}

/// Journal, year and author distributions over `references`.
///
/// Every distinct (normalized) DOI is counted once, so repeating a reference
/// never changes the tables or the percentages.
pub fn compute_statistics(references: &[FormattedReference], current_year: i32) -> Statistics {
    let mut seen = HashSet::new();
    let unique: Vec<&CanonicalMetadata> = references
        .iter()
        .filter_map(FormattedReference::metadata)
        .filter(|md| {
            let doi = normalize_doi(&md.doi);
            !doi.is_empty() && seen.insert(doi)
        })
        .collect();
    let total = unique.len();

    let mut journals = Tally::default();
    let mut authors = Tally::default();
    let mut years: HashMap<i32, usize> = HashMap::new();
    for md in &unique {
        if !md.journal.is_empty() {
            journals.add(md.journal.clone());
        }
        if let Some(year) = md.year {
            *years.entry(year).or_default() += 1;
        }
        for author in md.authors.iter().filter(|a| !a.family.is_empty()) {
            authors.add(author_label(&author.family, &author.given));
        }
    }

    let journal_stats = journals
        .top(TOP_N)
        .into_iter()
        .map(|(journal, count)| JournalStat {
            journal,
            count,
            percentage: percentage(count, total),
        })
        .collect();

    let year_stats = (OLDEST_REPORTED_YEAR..=current_year)
        .rev()
        .filter_map(|year| {
            let count = years.get(&year).copied()?;
            Some(YearStat {
                year,
                count,
                percentage: percentage(count, total),
            })
        })
        .collect();

    let author_stats: Vec<AuthorStat> = authors
        .top(TOP_N)
        .into_iter()
        .map(|(author, count)| AuthorStat {
            author,
            count,
            percentage: percentage(count, total),
        })
        .collect();

    let recent: usize = (current_year - RECENT_YEARS + 1..=current_year)
        .filter_map(|year| years.get(&year))
        .sum();
    let needs_more_recent_references = percentage(recent, total) < RECENT_SHARE_MIN;
    let has_frequent_author = author_stats.iter().any(|a| a.percentage > AUTHOR_SHARE_MAX);

    Statistics {
        journal_stats,
        year_stats,
        author_stats,
        total_unique_dois: total,
        needs_more_recent_references,
        has_frequent_author,
    }
}

/// [`compute_statistics`] relative to the local calendar year.
pub fn compute_statistics_now(references: &[FormattedReference]) -> Statistics {
    compute_statistics(references, chrono::Local::now().year())
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalStat {
    pub journal: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearStat {
    pub year: i32,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorStat {
    /// `Family I.` form.
    pub author: String,
    pub count: usize,
    pub percentage: f64,
}

/// Bibliography-level distribution tables. Percentages are relative to the
/// number of unique DOIs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub journal_stats: Vec<JournalStat>,
    pub year_stats: Vec<YearStat>,
    pub author_stats: Vec<AuthorStat>,
    pub total_unique_dois: usize,
    pub needs_more_recent_references: bool,
    pub has_frequent_author: bool,
}

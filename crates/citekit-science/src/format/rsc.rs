use std::sync::Arc;

use citekit_core::{AuthorFormat, CanonicalMetadata, JournalStyle, StyledRun, runs_to_plain_text};

use crate::abbreviation::AbbreviationTable;
use crate::format::CitationFormatter;
use crate::format::common::{format_author, join_names, split_range, tidy_runs};

/// Royal Society of Chemistry: `I.I. Family, I.I. Family and I.I. Family, J. Abbr., Year, Vol, firstPage.`
pub struct RscFormatter {
    journal_style: JournalStyle,
    author_separator: String,
    abbreviations: Arc<AbbreviationTable>,
}

impl RscFormatter {
    pub fn new(
        journal_style: JournalStyle,
        author_separator: impl Into<String>,
        abbreviations: Arc<AbbreviationTable>,
    ) -> Self {
        Self {
            journal_style,
            author_separator: author_separator.into(),
            abbreviations,
        }
    }
}

fn first_page(pages: &str, article_number: &str) -> String {
    let pages = pages.trim();
    if pages.is_empty() {
        return article_number.to_string();
    }
    match split_range(pages) {
        Some((start, _)) => start.to_string(),
        None => pages.to_string(),
    }
}

impl CitationFormatter for RscFormatter {
    fn name(&self) -> &'static str {
        "RSC"
    }

    fn runs(&self, md: &CanonicalMetadata) -> Vec<StyledRun> {
        let names: Vec<String> = md
            .authors
            .iter()
            .map(|a| format_author(a, AuthorFormat::DottedInitialsSurname))
            .collect();
        let authors = join_names(&names, &self.author_separator, Some(" and "));
        let journal = self.abbreviations.abbreviate(&md.journal, self.journal_style);

        let mut runs = vec![
            StyledRun::plain(authors, ", "),
            StyledRun::plain(journal, ", ").italic(),
            StyledRun::plain(md.year_text(), ", "),
            StyledRun::plain(md.volume.clone(), ", ").bold(),
            StyledRun::plain(first_page(&md.pages, &md.article_number), "."),
        ];
        tidy_runs(&mut runs);
        runs
    }

    fn preview(&self, md: &CanonicalMetadata) -> String {
        runs_to_plain_text(&self.runs(md))
    }
}

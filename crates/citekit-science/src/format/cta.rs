use std::sync::Arc;

use citekit_core::{AuthorFormat, CanonicalMetadata, JournalStyle, StyledRun, runs_to_plain_text};

use crate::abbreviation::AbbreviationTable;
use crate::format::CitationFormatter;
use crate::format::common::{differing_suffix, format_author, split_range, tidy_runs};

/// CTA: `Family II, Family II. Title. J Abbr. Year;Vol(Issue):pages. doi:DOI`.
///
/// The journal is always abbreviated without periods and the whole
/// `doi:` token is one hyperlink run.
pub struct CtaFormatter {
    abbreviations: Arc<AbbreviationTable>,
}

impl CtaFormatter {
    pub fn new(abbreviations: Arc<AbbreviationTable>) -> Self {
        Self { abbreviations }
    }
}

/// `6441-6446` → `6441–6`.
fn cta_pages(pages: &str, article_number: &str) -> String {
    let pages = pages.trim();
    if pages.is_empty() {
        return article_number.to_string();
    }
    match split_range(pages) {
        Some((start, end)) => format!("{start}–{}", differing_suffix(start, end)),
        None => pages.to_string(),
    }
}

impl CitationFormatter for CtaFormatter {
    fn name(&self) -> &'static str {
        "CTA"
    }

    fn runs(&self, md: &CanonicalMetadata) -> Vec<StyledRun> {
        let authors = md
            .authors
            .iter()
            .map(|a| format_author(a, AuthorFormat::SurnameInitials))
            .collect::<Vec<_>>()
            .join(", ");
        let journal = self
            .abbreviations
            .abbreviate(&md.journal, JournalStyle::AbbreviatedNoDots);

        let mut runs = vec![
            StyledRun::plain(authors, ". "),
            StyledRun::plain(md.title.clone(), ". "),
            StyledRun::plain(journal, ". ").italic(),
            StyledRun::plain(md.year_text(), ";"),
        ];
        if md.issue.is_empty() {
            runs.push(StyledRun::plain(md.volume.clone(), ":"));
        } else {
            runs.push(StyledRun::plain(md.volume.clone(), ""));
            runs.push(StyledRun::plain(format!("({})", md.issue), ":"));
        }
        runs.push(StyledRun::plain(cta_pages(&md.pages, &md.article_number), ". "));
        runs.push(StyledRun::doi_link(format!("doi:{}", md.doi), md.doi.clone()));
        tidy_runs(&mut runs);
        runs
    }

    fn preview(&self, md: &CanonicalMetadata) -> String {
        runs_to_plain_text(&self.runs(md))
    }
}

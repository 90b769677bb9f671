use std::sync::Arc;

use citekit_core::{AuthorFormat, CanonicalMetadata, JournalStyle, StyledRun, runs_to_plain_text};

use crate::abbreviation::AbbreviationTable;
use crate::format::CitationFormatter;
use crate::format::common::{format_author, split_range, tidy_runs};

const MINUS: char = '−';

/// ACS / MDPI: `Family, I.I.; Family, I.I. Title. J. Abbr. Year, Vol, pages.`
pub struct AcsFormatter {
    journal_style: JournalStyle,
    abbreviations: Arc<AbbreviationTable>,
}

impl AcsFormatter {
    pub fn new(journal_style: JournalStyle, abbreviations: Arc<AbbreviationTable>) -> Self {
        Self {
            journal_style,
            abbreviations,
        }
    }
}

/// Ranges like `122-128` keep only the last digit of the end page when the
/// two pages differ only there.
fn acs_pages(pages: &str, article_number: &str) -> String {
    let pages = pages.trim();
    if pages.is_empty() {
        return article_number.to_string();
    }
    let Some((start, end)) = split_range(pages) else {
        return pages.to_string();
    };

    let start_chars: Vec<char> = start.chars().collect();
    let end_chars: Vec<char> = end.chars().collect();
    let same_but_last = start_chars.len() == end_chars.len()
        && !end_chars.is_empty()
        && start_chars[..start_chars.len() - 1] == end_chars[..end_chars.len() - 1];
    match end_chars.last() {
        Some(last) if same_but_last => format!("{start}{MINUS}{last}"),
        _ => format!("{start}{MINUS}{end}"),
    }
}

impl CitationFormatter for AcsFormatter {
    fn name(&self) -> &'static str {
        "ACS"
    }

    fn runs(&self, md: &CanonicalMetadata) -> Vec<StyledRun> {
        let authors = md
            .authors
            .iter()
            .map(|a| format_author(a, AuthorFormat::SurnameCommaDottedInitials))
            .collect::<Vec<_>>()
            .join("; ");
        let journal = self.abbreviations.abbreviate(&md.journal, self.journal_style);

        let mut runs = vec![
            StyledRun::plain(authors, " "),
            StyledRun::plain(md.title.clone(), ". "),
            StyledRun::plain(journal, " ").italic(),
            StyledRun::plain(md.year_text(), ", ").bold(),
            StyledRun::plain(md.volume.clone(), ", ").italic(),
            StyledRun::plain(acs_pages(&md.pages, &md.article_number), "."),
        ];
        tidy_runs(&mut runs);
        runs
    }

    fn preview(&self, md: &CanonicalMetadata) -> String {
        runs_to_plain_text(&self.runs(md))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures::smith_doe;

    fn formatter(style: JournalStyle) -> AcsFormatter {
        AcsFormatter::new(style, Arc::new(AbbreviationTable::bundled()))
    }

    #[test]
    fn full_reference() {
        assert_eq!(
            formatter(JournalStyle::AbbreviatedDots).preview(&smith_doe()),
            "Smith, J.; Doe, A. Some Title. J. Chem. 2020, 15, 122−8."
        );
    }

    #[test]
    fn emphasis_follows_the_layout() {
        let runs = formatter(JournalStyle::AbbreviatedDots).runs(&smith_doe());
        assert!(runs[2].italic && !runs[2].bold);
        assert!(runs[3].bold);
        assert!(runs[4].italic);
        assert_eq!(runs[5].separator, ".");
    }

    #[test]
    fn page_shortening_uses_minus_sign() {
        assert_eq!(acs_pages("122-128", ""), "122−8");
        assert_eq!(acs_pages("95-102", ""), "95−102");
        assert_eq!(acs_pages("1199-1203", ""), "1199−1203");
        assert_eq!(acs_pages("", "e12"), "e12");
        assert_eq!(acs_pages("77", ""), "77");
    }

    #[test]
    fn title_ending_in_period_is_not_doubled() {
        let md = CanonicalMetadata {
            title: "Ends with a period.".to_string(),
            ..smith_doe()
        };
        assert!(
            formatter(JournalStyle::Full)
                .preview(&md)
                .contains("Ends with a period. Journal of Chemistry 2020")
        );
    }
}

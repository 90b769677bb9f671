use std::sync::Arc;

use citekit_core::{CanonicalMetadata, ElementKind, StyleConfig, StyledRun};

use crate::abbreviation::AbbreviationTable;
use crate::format::common::{format_authors, format_doi, format_pages, tidy_runs};
use crate::format::{CitationFormatter, collapse_periods};

/// The user-configurable element pipeline.
pub struct CustomFormatter {
    style: StyleConfig,
    abbreviations: Arc<AbbreviationTable>,
}

impl CustomFormatter {
    pub fn new(style: StyleConfig, abbreviations: Arc<AbbreviationTable>) -> Self {
        Self {
            style,
            abbreviations,
        }
    }

    fn element_value(&self, kind: ElementKind, md: &CanonicalMetadata) -> String {
        match kind {
            ElementKind::Authors => format_authors(&md.authors, &self.style),
            ElementKind::Title => md.title.clone(),
            ElementKind::Journal => self.abbreviations.abbreviate(&md.journal, self.style.journal_style),
            ElementKind::Year => md.year_text(),
            ElementKind::Volume => md.volume.clone(),
            ElementKind::Issue => md.issue.clone(),
            ElementKind::Pages => format_pages(&md.pages, &md.article_number, self.style.page_format),
            ElementKind::Doi => format_doi(&md.doi, self.style.doi_format),
        }
    }
}

impl CitationFormatter for CustomFormatter {
    fn name(&self) -> &'static str {
        "Custom"
    }

    fn runs(&self, md: &CanonicalMetadata) -> Vec<StyledRun> {
        let mut runs = Vec::with_capacity(self.style.elements.len());
        let mut last_kind = None;
        for (kind, config) in &self.style.elements {
            let mut value = self.element_value(*kind, md);
            if value.is_empty() {
                continue;
            }
            if config.parentheses {
                value = format!("({value})");
            }

            let mut run = StyledRun::plain(value, config.separator.clone())
                .with_emphasis(config.italic, config.bold);
            if *kind == ElementKind::Doi && self.style.doi_hyperlink {
                run.is_doi_hyperlink = true;
                run.doi = Some(md.doi.clone());
            }
            runs.push(run);
            last_kind = Some(*kind);
        }

        if let Some(last) = runs.last_mut() {
            if self.style.final_punctuation {
                // A DOI's own trailing period is part of the identifier.
                if last_kind != Some(ElementKind::Doi) {
                    last.text = last.text.trim_end_matches([',', '.']).to_string();
                }
                last.separator = ".".to_string();
            } else {
                last.separator.clear();
            }
        }
        tidy_runs(&mut runs);
        runs
    }

    /// Inline `<i>`/`<b>` markup; bold wraps italic.
    fn preview(&self, md: &CanonicalMetadata) -> String {
        let mut out = String::new();
        for run in self.runs(md) {
            let mut text = run.text;
            if run.italic {
                text = format!("<i>{text}</i>");
            }
            if run.bold {
                text = format!("<b>{text}</b>");
            }
            out.push_str(&text);
            out.push_str(&run.separator);
        }
        collapse_periods(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures::smith_doe;
    use citekit_core::{DoiFormat, ElementConfig, JournalStyle, runs_to_plain_text};

    fn formatter(style: StyleConfig) -> CustomFormatter {
        CustomFormatter::new(style, Arc::new(AbbreviationTable::bundled()))
    }

    #[test]
    fn default_custom_layout() {
        let f = formatter(StyleConfig::default_custom());
        let md = smith_doe();
        assert_eq!(
            runs_to_plain_text(&f.runs(&md)),
            "J Smith, A Doe. Some Title. Journal of Chemistry. 2020, 15(3), 122–128. 10.1000/xyz."
        );
        assert_eq!(
            f.preview(&md),
            "J Smith, A Doe. Some Title. <i>Journal of Chemistry</i>. <b>2020</b>, 15(3), 122–128. 10.1000/xyz."
        );
    }

    #[test]
    fn trailing_doi_keeps_its_own_period() {
        let style = StyleConfig {
            final_punctuation: true,
            doi_hyperlink: true,
            elements: vec![
                (ElementKind::Title, ElementConfig::separated(". ")),
                (ElementKind::Doi, ElementConfig::separated("")),
            ],
            ..StyleConfig::default()
        };
        let md = CanonicalMetadata {
            doi: "10.1000/abc.".to_string(),
            ..smith_doe()
        };
        let f = formatter(style);
        let runs = f.runs(&md);
        let doi = runs.last().unwrap();
        assert_eq!(doi.text, "10.1000/abc.");
        assert_eq!(doi.separator, "");
        assert_eq!(doi.hyperlink_target().as_deref(), Some("https://doi.org/10.1000/abc."));
        assert_eq!(runs_to_plain_text(&runs), "Some Title. 10.1000/abc.");
        assert_eq!(f.preview(&md), "Some Title. 10.1000/abc.");
    }

    #[test]
    fn empty_elements_are_skipped_and_last_separator_suppressed() {
        let style = StyleConfig {
            elements: vec![
                (ElementKind::Title, ElementConfig::separated(", ")),
                (ElementKind::Issue, ElementConfig::separated(", ")),
                (ElementKind::Year, ElementConfig::separated(", ")),
            ],
            ..StyleConfig::default()
        };
        let md = CanonicalMetadata {
            issue: String::new(),
            ..smith_doe()
        };
        let runs = formatter(style).runs(&md);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs_to_plain_text(&runs), "Some Title, 2020");
    }

    #[test]
    fn final_punctuation_replaces_trailing_comma() {
        let style = StyleConfig {
            final_punctuation: true,
            elements: vec![
                (ElementKind::Title, ElementConfig::separated(", ")),
                (ElementKind::Volume, ElementConfig::separated(", ")),
            ],
            ..StyleConfig::default()
        };
        let md = CanonicalMetadata {
            volume: "15,".to_string(),
            ..smith_doe()
        };
        assert_eq!(runs_to_plain_text(&formatter(style).runs(&md)), "Some Title, 15.");
    }

    #[test]
    fn abbreviated_journal_does_not_double_periods() {
        let style = StyleConfig {
            journal_style: JournalStyle::AbbreviatedDots,
            elements: vec![
                (ElementKind::Journal, ElementConfig::separated(". ")),
                (ElementKind::Year, ElementConfig::separated("")),
            ],
            ..StyleConfig::default()
        };
        let f = formatter(style);
        let md = smith_doe();
        assert_eq!(runs_to_plain_text(&f.runs(&md)), "J. Chem. 2020");
        assert_eq!(f.preview(&md), "J. Chem. 2020");
    }

    #[test]
    fn doi_hyperlink_targets_doi_org_regardless_of_display() {
        let style = StyleConfig {
            doi_format: DoiFormat::DxUrl,
            doi_hyperlink: true,
            elements: vec![(ElementKind::Doi, ElementConfig::separated(""))],
            ..StyleConfig::default()
        };
        let runs = formatter(style.clone()).runs(&smith_doe());
        assert_eq!(runs[0].text, "https://dx.doi.org/10.1000/xyz");
        assert_eq!(
            runs[0].hyperlink_target().as_deref(),
            Some("https://doi.org/10.1000/xyz")
        );

        let plain = StyleConfig {
            doi_hyperlink: false,
            ..style
        };
        assert!(!formatter(plain).runs(&smith_doe())[0].is_doi_hyperlink);
    }

    #[test]
    fn parentheses_and_emphasis() {
        let style = StyleConfig {
            elements: vec![(
                ElementKind::Year,
                ElementConfig {
                    italic: true,
                    bold: true,
                    parentheses: true,
                    separator: String::new(),
                },
            )],
            ..StyleConfig::default()
        };
        assert_eq!(formatter(style).preview(&smith_doe()), "<b><i>(2020)</i></b>");
    }
}

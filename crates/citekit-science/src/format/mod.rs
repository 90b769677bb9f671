pub mod acs;
pub mod common;
pub mod cta;
pub mod custom;
pub mod gost;
pub mod rsc;

use std::sync::Arc;

use citekit_core::{CanonicalMetadata, Labels, Language, NamedStyle, Rendered, StyleConfig, StyledRun};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::abbreviation::AbbreviationTable;
use crate::error::Result;

pub use acs::AcsFormatter;
pub use cta::CtaFormatter;
pub use custom::CustomFormatter;
pub use gost::GostFormatter;
pub use rsc::RscFormatter;

static REPEATED_PERIODS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{2,}").expect("valid repeated periods regex"));

/// One citation layout. Implementations are pure: the same metadata always
/// renders to the same runs and preview.
pub trait CitationFormatter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Ordered runs for rich writers. The last run carries the terminal punctuation.
    fn runs(&self, metadata: &CanonicalMetadata) -> Vec<StyledRun>;

    /// Single-line rendering for on-screen display.
    fn preview(&self, metadata: &CanonicalMetadata) -> String;
}

/// Run-wide inputs shared by every formatter.
#[derive(Debug, Clone)]
pub struct FormatContext {
    pub abbreviations: Arc<AbbreviationTable>,
    pub language: Language,
}

impl FormatContext {
    pub fn new(abbreviations: Arc<AbbreviationTable>, language: Language) -> Self {
        Self {
            abbreviations,
            language,
        }
    }
}

/// Select the formatter for `style` once per run.
pub fn formatter_for(style: &StyleConfig, ctx: &FormatContext) -> Result<Box<dyn CitationFormatter>> {
    style.validate()?;
    let formatter: Box<dyn CitationFormatter> = match style.named_style() {
        Some(NamedStyle::Gost) => Box::new(GostFormatter::new(ctx.language.labels())),
        Some(NamedStyle::Acs) => Box::new(AcsFormatter::new(
            style.journal_style,
            ctx.abbreviations.clone(),
        )),
        Some(NamedStyle::Rsc) => Box::new(RscFormatter::new(
            style.journal_style,
            style.author_separator.clone(),
            ctx.abbreviations.clone(),
        )),
        Some(NamedStyle::Cta) => Box::new(CtaFormatter::new(ctx.abbreviations.clone())),
        None => Box::new(CustomFormatter::new(style.clone(), ctx.abbreviations.clone())),
    };
    Ok(formatter)
}

/// Render `metadata`, or the localized error text when there is none.
/// The flag is `true` only for the error case.
pub fn format_reference(
    formatter: &dyn CitationFormatter,
    metadata: Option<&CanonicalMetadata>,
    for_preview: bool,
    labels: &Labels,
) -> (Rendered, bool) {
    match metadata {
        None => (Rendered::Preview(labels.format_error.to_string()), true),
        Some(md) if for_preview => (Rendered::Preview(formatter.preview(md)), false),
        Some(md) => (Rendered::Runs(formatter.runs(md)), false),
    }
}

/// Collapse runs of two or more periods to one.
pub fn collapse_periods(text: &str) -> String {
    REPEATED_PERIODS_RE.replace_all(text, ".").into_owned()
}


#[cfg(test)]
mod tests {
    use super::*;
    use citekit_core::{EN_LABELS, runs_to_plain_text};

    fn ctx() -> FormatContext {
        FormatContext::new(Arc::new(AbbreviationTable::bundled()), Language::En)
    }

    #[test]
    fn collapses_concatenation_artifacts() {
        assert_eq!(collapse_periods("J. Abbr.. 2020..."), "J. Abbr. 2020.");
        assert_eq!(collapse_periods("no dots here"), "no dots here");
    }

    #[test]
    fn selects_one_strategy_per_named_style() {
        let cases = [
            (StyleConfig::preset(NamedStyle::Gost), "GOST"),
            (StyleConfig::preset(NamedStyle::Acs), "ACS"),
            (StyleConfig::preset(NamedStyle::Rsc), "RSC"),
            (StyleConfig::preset(NamedStyle::Cta), "CTA"),
            (StyleConfig::default_custom(), "Custom"),
        ];
        for (style, name) in cases {
            assert_eq!(formatter_for(&style, &ctx()).unwrap().name(), name);
        }
    }

    #[test]
    fn named_style_formats_despite_leftover_elements() {
        let mut style = StyleConfig::preset(NamedStyle::Gost);
        let mut leftovers = StyleConfig::default_custom().elements;
        leftovers.push(leftovers[0].clone());
        style.elements = leftovers;
        assert_eq!(style.elements.len(), 9);

        let formatter = formatter_for(&style, &ctx()).unwrap();
        assert_eq!(formatter.name(), "GOST");
        let md = fixtures::smith_doe();
        let plain = GostFormatter::new(Language::En.labels()).preview(&md);
        assert_eq!(formatter.preview(&md), plain);
    }

    #[test]
    fn rsc_reads_author_separator_from_style() {
        let mut style = StyleConfig::preset(NamedStyle::Rsc);
        style.author_separator = "; ".to_string();
        let md = CanonicalMetadata {
            authors: vec![
                citekit_core::Author::new("A", "Lee"),
                citekit_core::Author::new("B", "Kim"),
                citekit_core::Author::new("C", "Park"),
            ],
            ..fixtures::smith_doe()
        };
        let runs = formatter_for(&style, &ctx()).unwrap().runs(&md);
        assert_eq!(runs[0].text, "A. Lee; B. Kim and C. Park");
    }

    #[test]
    fn invalid_style_is_rejected_up_front() {
        let style = StyleConfig {
            gost_style: true,
            cta_style: true,
            ..StyleConfig::default()
        };
        assert!(formatter_for(&style, &ctx()).is_err());
    }

    #[test]
    fn missing_metadata_is_the_only_error() {
        let formatter = formatter_for(&StyleConfig::default_custom(), &ctx()).unwrap();
        let (rendered, is_error) = format_reference(formatter.as_ref(), None, false, &EN_LABELS);
        assert!(is_error);
        assert_eq!(rendered, Rendered::Preview(EN_LABELS.format_error.to_string()));

        let md = fixtures::smith_doe();
        let (rendered, is_error) = format_reference(formatter.as_ref(), Some(&md), false, &EN_LABELS);
        assert!(!is_error);
        assert!(matches!(rendered, Rendered::Runs(_)));
    }

    #[test]
    fn formatting_is_deterministic_for_every_style() {
        let md = fixtures::smith_doe();
        for style in [
            StyleConfig::preset(NamedStyle::Gost),
            StyleConfig::preset(NamedStyle::Acs),
            StyleConfig::preset(NamedStyle::Rsc),
            StyleConfig::preset(NamedStyle::Cta),
            StyleConfig::default_custom(),
        ] {
            let a = formatter_for(&style, &ctx()).unwrap();
            let b = formatter_for(&style, &ctx()).unwrap();
            assert_eq!(a.runs(&md), b.runs(&md));
            assert_eq!(a.preview(&md), b.preview(&md));
        }
    }

    #[test]
    fn named_style_previews_match_their_runs() {
        let md = fixtures::smith_doe();
        for named in [NamedStyle::Gost, NamedStyle::Acs, NamedStyle::Rsc, NamedStyle::Cta] {
            let formatter = formatter_for(&StyleConfig::preset(named), &ctx()).unwrap();
            assert_eq!(
                runs_to_plain_text(&formatter.runs(&md)),
                formatter.preview(&md),
                "{named:?}"
            );
        }
    }
}

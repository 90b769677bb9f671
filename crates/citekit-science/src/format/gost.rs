use citekit_core::{AuthorFormat, CanonicalMetadata, Labels, StyledRun};

use crate::format::common::{format_author, split_range};
use crate::format::{CitationFormatter, collapse_periods};

/// GOST R 7.0.5 article layout:
/// `Family, I.I. Title / I.I. Family, … // Journal. – Year. – Vol. N. – No. M. – P. a–b. – URL`.
///
/// The journal is never abbreviated. Only the DOI URL is a hyperlink.
pub struct GostFormatter {
    labels: &'static Labels,
}

impl GostFormatter {
    pub fn new(labels: &'static Labels) -> Self {
        Self { labels }
    }

    /// Everything before the DOI URL, ending in ` – `.
    fn body(&self, md: &CanonicalMetadata) -> String {
        let labels = self.labels;
        let lead = md
            .authors
            .first()
            .map(|a| format_author(a, AuthorFormat::SurnameCommaDottedInitials))
            .unwrap_or_default();
        let all = md
            .authors
            .iter()
            .map(|a| format_author(a, AuthorFormat::DottedInitialsSurname))
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = format!(
            "{lead} {} / {all} // {}. – {}. – {} {}.",
            md.title,
            md.journal,
            md.year_text(),
            labels.volume,
            md.volume
        );
        if !md.issue.is_empty() {
            out.push_str(&format!(" – {} {}.", labels.issue, md.issue));
        }

        let pages = md.pages.trim();
        if !pages.is_empty() {
            let pages = match split_range(pages) {
                Some((start, end)) => format!("{start}–{end}"),
                None => pages.to_string(),
            };
            out.push_str(&format!(" – {} {pages}.", labels.page));
        } else if !md.article_number.is_empty() {
            out.push_str(&format!(" – {} {}.", labels.article, md.article_number));
        } else {
            out.push_str(&format!(" – {}.", labels.no_pagination));
        }
        out.push_str(" – ");

        collapse_periods(out.trim_start())
    }

    fn doi_url(md: &CanonicalMetadata) -> String {
        format!("https://doi.org/{}", md.doi)
    }
}

impl CitationFormatter for GostFormatter {
    fn name(&self) -> &'static str {
        "GOST"
    }

    fn runs(&self, md: &CanonicalMetadata) -> Vec<StyledRun> {
        vec![
            StyledRun::plain(self.body(md), ""),
            StyledRun::doi_link(Self::doi_url(md), md.doi.clone()),
        ]
    }

    fn preview(&self, md: &CanonicalMetadata) -> String {
        format!("{}{}", self.body(md), Self::doi_url(md))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures::smith_doe;
    use citekit_core::{EN_LABELS, RU_LABELS};

    const EXPECTED: &str = "Smith, J. Some Title / J. Smith, A. Doe // Journal of Chemistry. – 2020. – Vol. 15. – No. 3. – P. 122–128. – https://doi.org/10.1000/xyz";

    #[test]
    fn end_to_end_reference() {
        let formatter = GostFormatter::new(&EN_LABELS);
        assert_eq!(formatter.preview(&smith_doe()), EXPECTED);
    }

    #[test]
    fn url_is_the_only_hyperlink_run() {
        let runs = GostFormatter::new(&EN_LABELS).runs(&smith_doe());
        assert_eq!(runs.len(), 2);
        assert!(!runs[0].is_doi_hyperlink);
        assert!(EXPECTED.starts_with(&runs[0].text));
        assert_eq!(runs[1].text, "https://doi.org/10.1000/xyz");
        assert!(runs[1].is_doi_hyperlink);
        assert_eq!(runs[1].doi.as_deref(), Some("10.1000/xyz"));
        assert_eq!(format!("{}{}", runs[0].text, runs[1].text), EXPECTED);
    }

    #[test]
    fn page_range_uses_en_dash() {
        let md = CanonicalMetadata {
            pages: "6441-6446".to_string(),
            ..smith_doe()
        };
        assert!(GostFormatter::new(&EN_LABELS).preview(&md).contains("P. 6441–6446."));
    }

    #[test]
    fn pagination_fallbacks() {
        let formatter = GostFormatter::new(&EN_LABELS);
        let with_article = CanonicalMetadata {
            pages: String::new(),
            article_number: "104512".to_string(),
            issue: String::new(),
            ..smith_doe()
        };
        let preview = formatter.preview(&with_article);
        assert!(preview.contains("– Vol. 15. – Art. 104512. – https"));

        let neither = CanonicalMetadata {
            pages: String::new(),
            ..smith_doe()
        };
        assert!(formatter.preview(&neither).contains("– [No pagination]. – https"));
    }

    #[test]
    fn russian_labels() {
        let preview = GostFormatter::new(&RU_LABELS).preview(&smith_doe());
        assert!(preview.contains("– Т. 15. – № 3. – С. 122–128."));
    }

    #[test]
    fn journal_is_never_abbreviated() {
        let md = CanonicalMetadata {
            journal: "Journal of the American Chemical Society".to_string(),
            ..smith_doe()
        };
        assert!(
            GostFormatter::new(&EN_LABELS)
                .preview(&md)
                .contains("// Journal of the American Chemical Society.")
        );
    }
}

use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_HEADER_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^NOTES?\s+AND\s+REFERENCES?$",
        r"^REFERENCES?$",
        r"^BIBLIOGRAPHY$",
        r"^LITERATURE$",
        r"^WORKS?\s+CITED$",
        r"^SOURCES?$",
        r"^CHAPTER\s+\d+$",
        r"^SECTION\s+\d+$",
        r"^PART\s+\d+$",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("valid section header regex"))
    .collect()
});

/// DOI token patterns in priority order; group 1 is the DOI itself.
static DOI_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)https?://doi\.org/(10\.\d{4,9}/[-._;()/:A-Za-z0-9]+)",
        r"(?i)doi:\s*(10\.\d{4,9}/[-._;()/:A-Za-z0-9]+)",
        r"(?i)DOI:\s*(10\.\d{4,9}/[-._;()/:A-Za-z0-9]+)",
        r"(?i)\b(10\.\d{4,9}/[-._;()/:A-Za-z0-9]+)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid DOI regex"))
    .collect()
});

static DOI_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*(https?://doi\.org/|doi:)\s*[^\s,;]+").expect("valid DOI token regex")
});

/// Whole-line bibliography headings such as `REFERENCES` or `Chapter 3`.
pub fn is_section_header(text: &str) -> bool {
    let text = text.trim();
    SECTION_HEADER_RES.iter().any(|re| re.is_match(text))
}

/// First DOI token in `text`, with trailing `.,;:` removed.
pub fn find_doi_in_text(text: &str) -> Option<String> {
    DOI_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':']).to_string())
            .filter(|doi| !doi.is_empty())
    })
}

/// `text` with URL- or `doi:`-prefixed DOI tokens removed, trimmed.
pub fn strip_doi_tokens(text: &str) -> String {
    DOI_TOKEN_RE.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_section_headers_case_insensitively() {
        for header in [
            "REFERENCES",
            "References",
            "  bibliography ",
            "Notes and References",
            "Works Cited",
            "Chapter 12",
            "section 3",
            "PART 2",
            "Sources",
            "Literature",
        ] {
            assert!(is_section_header(header), "{header:?} should be a header");
        }
    }

    #[test]
    fn ordinary_references_are_not_headers() {
        assert!(!is_section_header("References to prior art in 10.1000/xyz"));
        assert!(!is_section_header("Chapter one"));
        assert!(!is_section_header("10.1000/xyz"));
    }

    #[test]
    fn all_surface_forms_yield_the_same_doi() {
        for text in [
            "See https://doi.org/10.1000/xyz.",
            "See doi:10.1000/xyz,",
            "See DOI: 10.1000/xyz;",
            "See 10.1000/xyz:",
            "http://doi.org/10.1000/xyz",
        ] {
            assert_eq!(find_doi_in_text(text).as_deref(), Some("10.1000/xyz"), "{text}");
        }
    }

    #[test]
    fn url_form_wins_over_later_bare_doi() {
        let text = "10.2000/second, also https://doi.org/10.1000/first";
        assert_eq!(find_doi_in_text(text).as_deref(), Some("10.1000/first"));
    }

    #[test]
    fn keeps_structured_suffixes() {
        let text = "Smith J. Nature 2015. doi:10.1016/S0140-6736(20)30183-5.";
        assert_eq!(
            find_doi_in_text(text).as_deref(),
            Some("10.1016/S0140-6736(20)30183-5")
        );
    }

    #[test]
    fn no_doi_in_plain_text() {
        assert_eq!(find_doi_in_text("Smith J. Some Title. J. Chem. 2020"), None);
    }

    #[test]
    fn strips_prefixed_tokens() {
        let text = "Smith J. Title. J. Chem. 2020, doi:10.1/abc, https://doi.org/10.1/def";
        assert_eq!(strip_doi_tokens(text), "Smith J. Title. J. Chem. 2020,,");
    }
}

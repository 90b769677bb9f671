use citekit_core::{Author, CanonicalMetadata};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::sources::crossref::{CrossRefAuthor, CrossRefWork};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid tag regex"));
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#\d+|[A-Za-z][A-Za-z0-9]*);").expect("valid entity regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", " "),
    ("ndash", "–"),
    ("mdash", "—"),
    ("hyphen", "-"),
    ("minus", "−"),
    ("rsquo", "’"),
    ("lsquo", "‘"),
    ("rdquo", "”"),
    ("ldquo", "“"),
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("kappa", "κ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("pi", "π"),
    ("sigma", "σ"),
    ("omega", "ω"),
    ("deg", "°"),
    ("times", "×"),
];

/// Strip markup tags (`<i>`, `<sub>`, JATS elements) and decode entities.
/// Unknown entities are dropped. Whitespace runs collapse to one space.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let without_tags = TAG_RE.replace_all(text, "");
    let decoded = ENTITY_RE.replace_all(&without_tags, |caps: &Captures| decode_entity(&caps[1]));
    WHITESPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

fn decode_entity(body: &str) -> String {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse::<u32>().ok(),
        };
        return code.and_then(char::from_u32).map(String::from).unwrap_or_default();
    }
    NAMED_ENTITIES
        .iter()
        .find(|(name, _)| *name == body)
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

/// Name-case a family name. Hyphen- and apostrophe-joined parts are each
/// capitalized: `o'neil-SMITH` → `O'Neil-Smith`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut part = String::new();
    for ch in name.chars() {
        if matches!(ch, '-' | '\'' | '’') {
            out.push_str(&capitalize(&part));
            out.push(ch);
            part.clear();
        } else {
            part.push(ch);
        }
    }
    out.push_str(&capitalize(&part));
    out
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn author_from_crossref(author: &CrossRefAuthor) -> Author {
    let given = author.given.clone().unwrap_or_default();
    let family = match (&author.family, &author.name) {
        (Some(family), _) => normalize_name(family),
        // Group authors carry only a display name; keep it as written.
        (None, Some(name)) => name.clone(),
        (None, None) => String::new(),
    };
    Author { given, family }
}

/// Build the canonical record for `doi` from a Crossref work.
pub fn canonical_from_work(work: &CrossRefWork, doi: &str) -> CanonicalMetadata {
    CanonicalMetadata {
        authors: work.author.iter().map(author_from_crossref).collect(),
        title: work.title.first().map(|t| clean_text(t)).unwrap_or_default(),
        journal: work
            .container_title
            .first()
            .map(|j| clean_text(j))
            .unwrap_or_default(),
        year: work.published_year,
        volume: work.volume.clone().unwrap_or_default(),
        issue: work.issue.clone().unwrap_or_default(),
        pages: work.page.clone().unwrap_or_default(),
        article_number: work.article_number.clone().unwrap_or_default(),
        doi: doi.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_casing_handles_compound_surnames() {
        assert_eq!(normalize_name("SMITH"), "Smith");
        assert_eq!(normalize_name("o'neil-SMITH"), "O'Neil-Smith");
        assert_eq!(normalize_name("d’ALEMBERT"), "D’Alembert");
        assert_eq!(normalize_name("van der berg"), "Van der berg");
        assert_eq!(normalize_name("x"), "X");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn clean_text_strips_markup_and_entities() {
        assert_eq!(
            clean_text("CO<sub>2</sub> reduction on <i>Cu</i> &amp; Ag"),
            "CO2 reduction on Cu & Ag"
        );
        assert_eq!(clean_text("  A&#8211;B &#x3b1;-helix &unknown; "), "A–B α-helix");
        assert_eq!(clean_text("<jats:title>Multi\n line</jats:title>"), "Multi line");
        assert_eq!(clean_text("Fish &amp;lt; chips"), "Fish &lt; chips");
    }

    #[test]
    fn canonical_record_defaults_missing_fields() {
        let work = CrossRefWork {
            doi: "10.1000/XYZ".to_string(),
            title: vec!["A <i>Title</i>".to_string()],
            author: vec![
                CrossRefAuthor {
                    given: Some("Jane".to_string()),
                    family: Some("DOE".to_string()),
                    name: None,
                },
                CrossRefAuthor {
                    given: None,
                    family: None,
                    name: Some("ATLAS Collaboration".to_string()),
                },
            ],
            published_year: Some(2021),
            container_title: vec!["Journal of Things".to_string()],
            ..Default::default()
        };

        let md = canonical_from_work(&work, "10.1000/xyz");
        assert_eq!(md.title, "A Title");
        assert_eq!(md.authors[0], Author::new("Jane", "Doe"));
        assert_eq!(md.authors[1].family, "ATLAS Collaboration");
        assert_eq!(md.journal, "Journal of Things");
        assert_eq!(md.volume, "");
        assert_eq!(md.pages, "");
        assert_eq!(md.article_number, "");
        assert_eq!(md.doi, "10.1000/xyz");
    }
}

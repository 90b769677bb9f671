//! Building blocks shared by the citation formatters.

use citekit_core::{Author, AuthorFormat, DoiFormat, PageFormat, StyleConfig, StyledRun};

use crate::format::collapse_periods;

// ─── Authors ──────────────────────────────────────────────────────────────────

pub fn format_author(author: &Author, format: AuthorFormat) -> String {
    let (first, second) = author.initials();
    let family = &author.family;
    if first.is_empty() {
        return family.clone();
    }
    match format {
        AuthorFormat::InitialsSurname => format!("{first}{second} {family}"),
        AuthorFormat::DottedInitialsSurname => format!("{} {family}", author.dotted_initials()),
        AuthorFormat::SurnameInitials => format!("{family} {first}{second}"),
        AuthorFormat::SurnameDottedInitials => format!("{family} {}", author.dotted_initials()),
        AuthorFormat::SurnameCommaDottedInitials => {
            format!("{family}, {}", author.dotted_initials())
        }
    }
}

/// Join names with `separator`; the join before the last name uses
/// `last_joiner` when given.
pub fn join_names(names: &[String], separator: &str, last_joiner: Option<&str>) -> String {
    let mut out = String::new();
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            match last_joiner {
                Some(joiner) if i == names.len() - 1 => out.push_str(joiner),
                _ => out.push_str(separator),
            }
        }
        out.push_str(name);
    }
    out
}

/// Author list under the configurable rules: name order, separator, the
/// and/& joiner, and the et-al cutoff (ignored while a joiner is active).
pub fn format_authors(authors: &[Author], style: &StyleConfig) -> String {
    if authors.is_empty() {
        return String::new();
    }

    let joiner = if style.use_and {
        Some(" and ")
    } else if style.use_ampersand {
        Some(" & ")
    } else {
        None
    };
    let limit = match joiner {
        None if style.et_al_limit > 0 => style.et_al_limit.min(authors.len()),
        _ => authors.len(),
    };

    let names: Vec<String> = authors[..limit]
        .iter()
        .map(|a| format_author(a, style.author_format))
        .collect();
    let mut out = join_names(&names, &style.author_separator, joiner);
    if joiner.is_none() && style.et_al_limit > 0 && authors.len() > style.et_al_limit {
        out.push_str(" et al");
    }
    out.trim().to_string()
}

// ─── Pages ────────────────────────────────────────────────────────────────────

/// `start-end` split on the first hyphen, both sides trimmed.
pub fn split_range(pages: &str) -> Option<(&str, &str)> {
    pages.split_once('-').map(|(start, end)| (start.trim(), end.trim()))
}

/// The part of `end` after its longest common prefix with `start`.
/// Falls back to the whole of `end` when nothing would remain.
pub fn differing_suffix<'a>(start: &str, end: &'a str) -> &'a str {
    let common = start
        .chars()
        .zip(end.chars())
        .take_while(|(a, b)| a == b)
        .count();
    let offset = end
        .char_indices()
        .nth(common)
        .map(|(i, _)| i)
        .unwrap_or(end.len());
    match &end[offset..] {
        "" => end,
        suffix => suffix,
    }
}

/// Pages under the configurable page format. Empty pages fall back to the
/// article number; a single page is returned as is.
pub fn format_pages(pages: &str, article_number: &str, format: PageFormat) -> String {
    let pages = pages.trim();
    if pages.is_empty() {
        return article_number.to_string();
    }
    let Some((start, end)) = split_range(pages) else {
        return pages.to_string();
    };
    match format {
        PageFormat::SpacedHyphen => format!("{start} - {end}"),
        PageFormat::Hyphen => format!("{start}-{end}"),
        PageFormat::SpacedEnDash => format!("{start} – {end}"),
        PageFormat::EnDash => format!("{start}–{end}"),
        PageFormat::Abbreviated => format!("{start}–{}", differing_suffix(start, end)),
        PageFormat::FirstPage => start.to_string(),
    }
}

// ─── DOI ──────────────────────────────────────────────────────────────────────

pub fn format_doi(doi: &str, format: DoiFormat) -> String {
    match format {
        DoiFormat::Bare => doi.to_string(),
        DoiFormat::LowerPrefix => format!("doi:{doi}"),
        DoiFormat::UpperPrefix => format!("DOI:{doi}"),
        DoiFormat::DxUrl => format!("https://dx.doi.org/{doi}"),
    }
}

// ─── Runs ─────────────────────────────────────────────────────────────────────

/// Collapse period runs inside each run and drop a separator's leading
/// period when the run text already ends with one.
pub fn tidy_runs(runs: &mut [StyledRun]) {
    for run in runs.iter_mut() {
        if !run.is_doi_hyperlink {
            run.text = collapse_periods(&run.text);
        }
        if run.text.ends_with('.') && run.separator.starts_with('.') {
            run.separator.remove(0);
        }
    }
}

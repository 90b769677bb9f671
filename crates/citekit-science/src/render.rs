use std::fmt::Write as _;

use citekit_core::{FormattedReference, Labels, Statistics, StyleConfig};

use crate::pipeline::BatchOutcome;

/// One numbered line per entry. Errors carry a leading `!! ` flag and
/// duplicates point back at the first occurrence (1-based).
pub fn render_plain_text(outcome: &BatchOutcome, style: &StyleConfig, labels: &Labels) -> String {
    let mut out = String::new();
    for (i, entry) in outcome.references.iter().enumerate() {
        out.push_str(&style.numbering.prefix(i));
        if entry.is_error() {
            out.push_str("!! ");
        }
        out.push_str(&entry.plain_text());
        if let Some(first) = outcome.duplicates.get(&i) {
            let _ = write!(out, " - {} {}", labels.duplicate_of, first + 1);
        }
        out.push('\n');
    }
    out
}

/// The DOI export: one entry per raw reference, blank-line separated.
pub fn render_doi_list(outcome: &BatchOutcome) -> String {
    let mut out = outcome.doi_list.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Journal, year and author tables followed by the warnings that apply.
pub fn render_statistics(stats: &Statistics, labels: &Labels) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Unique DOIs: {}", stats.total_unique_dois);

    table(
        &mut out,
        "Journal Frequency",
        "Journal",
        stats.journal_stats.iter().map(|s| (s.journal.clone(), s.count, s.percentage)),
    );
    table(
        &mut out,
        "Year Distribution",
        "Year",
        stats.year_stats.iter().map(|s| (s.year.to_string(), s.count, s.percentage)),
    );
    table(
        &mut out,
        "Author Distribution",
        "Author",
        stats.author_stats.iter().map(|s| (s.author.clone(), s.count, s.percentage)),
    );

    if stats.needs_more_recent_references {
        let _ = writeln!(out, "\n!! {}", labels.needs_more_recent);
    }
    if stats.has_frequent_author {
        let _ = writeln!(out, "\n!! {}", labels.frequent_author);
    }
    out
}

fn table(out: &mut String, title: &str, column: &str, rows: impl Iterator<Item = (String, usize, f64)>) {
    let rows: Vec<_> = rows.collect();
    let width = rows
        .iter()
        .map(|(name, _, _)| name.chars().count())
        .chain([column.len()])
        .max()
        .unwrap_or(0);

    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{column:<width$}  {:>5}  {:>7}", "Count", "%");
    for (name, count, pct) in rows {
        let pad = width - name.chars().count();
        let _ = writeln!(out, "{name}{:pad$}  {count:>5}  {pct:>7.2}", "");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::DuplicateMap;
    use citekit_core::{
        AuthorStat, CanonicalMetadata, EN_LABELS, JournalStat, Numbering, Rendered, YearStat,
    };

    fn outcome() -> BatchOutcome {
        let formatted = |text: &str| FormattedReference::Formatted {
            rendered: Rendered::Preview(text.to_string()),
            metadata: CanonicalMetadata::default(),
        };
        BatchOutcome {
            references: vec![
                FormattedReference::SectionHeader {
                    text: "REFERENCES".into(),
                },
                formatted("Smith J. Title. 2020."),
                FormattedReference::Error {
                    original: "Broken".into(),
                    message: "Broken [ERROR: DOI not found. Please check reference manually.]".into(),
                },
                formatted("Smith J. Title. 2020."),
            ],
            doi_found: 2,
            doi_not_found: 1,
            duplicates: DuplicateMap::from([(3, 1)]),
            doi_list: vec![
                "REFERENCES [SECTION HEADER - SKIPPED]".into(),
                "10.1/a".into(),
                "Broken\nPlease check this source and insert the DOI manually.".into(),
                "10.1/a".into(),
            ],
        }
    }

    #[test]
    fn numbered_lines_with_flags() {
        let style = StyleConfig {
            numbering: Numbering::Bracket,
            ..StyleConfig::default()
        };
        let text = render_plain_text(&outcome(), &style, &EN_LABELS);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[1] REFERENCES");
        assert_eq!(lines[1], "[2] Smith J. Title. 2020.");
        assert_eq!(
            lines[2],
            "[3] !! Broken [ERROR: DOI not found. Please check reference manually.]"
        );
        assert_eq!(lines[3], "[4] Smith J. Title. 2020. - Duplicate of reference 2");
    }

    #[test]
    fn unnumbered_output() {
        let text = render_plain_text(&outcome(), &StyleConfig::default(), &EN_LABELS);
        assert!(text.starts_with("REFERENCES\nSmith J."));
    }

    #[test]
    fn doi_list_is_blank_line_separated() {
        let text = render_doi_list(&outcome());
        assert!(text.starts_with("REFERENCES [SECTION HEADER - SKIPPED]\n\n10.1/a\n\nBroken\nPlease"));
        assert!(text.ends_with("10.1/a\n"));
    }

    #[test]
    fn statistics_tables_and_warnings() {
        let stats = Statistics {
            journal_stats: vec![JournalStat {
                journal: "Nature".into(),
                count: 2,
                percentage: 66.67,
            }],
            year_stats: vec![YearStat {
                year: 2012,
                count: 3,
                percentage: 100.0,
            }],
            author_stats: vec![AuthorStat {
                author: "Smith J.".into(),
                count: 3,
                percentage: 100.0,
            }],
            total_unique_dois: 3,
            needs_more_recent_references: true,
            has_frequent_author: true,
        };
        let text = render_statistics(&stats, &EN_LABELS);
        assert!(text.contains("Journal Frequency\nJournal  Count        %\nNature       2    66.67\n"));
        assert!(text.contains("2012      3   100.00"));
        assert!(text.contains(&format!("!! {}", EN_LABELS.needs_more_recent)));
        assert!(text.contains(&format!("!! {}", EN_LABELS.frequent_author)));
    }

    #[test]
    fn no_warnings_when_flags_are_clear() {
        let text = render_statistics(&Statistics::default(), &EN_LABELS);
        assert!(!text.contains("!!"));
    }
}

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

/// Leading list markers: `[1]`, `(1)`, `1.`, `1)`, `1]`. Bare-number markers
/// need trailing whitespace so a line that starts with a DOI stays intact.
static NUMBERED_REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\[\d+\]\s*|\(\d+\)\s*|\d+[.)\]]\s+)").expect("valid numbered reference regex")
});

/// Non-blank, trimmed lines of `text`, optionally without existing numbering.
pub fn parse_reference_lines(text: &str, strip_numbering: bool) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if strip_numbering {
                NUMBERED_REFERENCE_RE.replace(line, "").trim().to_string()
            } else {
                line.to_string()
            }
        })
        .filter(|line| !line.is_empty())
        .collect()
}

pub async fn read_reference_file(path: &Path, strip_numbering: bool) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(citekit_core::CitekitError::from)?;
    Ok(parse_reference_lines(&text, strip_numbering))
}

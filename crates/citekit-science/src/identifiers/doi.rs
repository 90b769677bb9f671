use crate::error::{Result, ScienceError};

const DOI_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
];

/// Validates `input` as a DOI and returns it without any resolver prefix,
/// case preserved.
pub fn parse_doi(input: &str) -> Result<String> {
    let input = input.trim();
    let stripped = strip_prefix_ci(input);

    // Validate: must start with "10.", contain "/", and have non-empty suffix
    if !stripped.starts_with("10.") {
        return Err(ScienceError::InvalidDoi(input.to_string()));
    }
    let (_, suffix) = stripped
        .split_once('/')
        .ok_or_else(|| ScienceError::InvalidDoi(input.to_string()))?;
    if suffix.trim().is_empty() {
        return Err(ScienceError::InvalidDoi(input.to_string()));
    }
    Ok(stripped.to_string())
}

/// Case- and prefix-insensitive comparison key for a DOI string.
///
/// Unlike [`parse_doi`] this never fails; empty input gives an empty key.
pub fn normalize_doi(doi: &str) -> String {
    strip_prefix_ci(doi.trim()).trim().to_lowercase()
}

fn strip_prefix_ci(input: &str) -> &str {
    for prefix in DOI_PREFIXES {
        if input.len() >= prefix.len()
            && input.is_char_boundary(prefix.len())
            && input[..prefix.len()].eq_ignore_ascii_case(prefix)
        {
            return input[prefix.len()..].trim_start();
        }
    }
    input
}

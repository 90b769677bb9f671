use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use citekit_core::{CanonicalMetadata, FormattedReference};
use sha2::{Digest, Sha256};

use crate::identifiers::doi::normalize_doi;

/// Later index → index of the first reference with the same fingerprint.
pub type DuplicateMap = BTreeMap<usize, usize>;

const TITLE_PREFIX_CHARS: usize = 50;

/// Content hash identifying the work a record describes.
///
/// Covers sorted lower-case family names, the first 50 characters of the
/// title, journal, year, volume, pages and the normalized DOI, so DOI
/// casing and `doi:`/URL prefixes do not matter.
pub fn fingerprint(md: &CanonicalMetadata) -> String {
    let mut key = String::new();

    if !md.authors.is_empty() {
        let mut families: Vec<String> = md.authors.iter().map(|a| a.family.to_lowercase()).collect();
        families.sort();
        key.push_str(&families.join("|"));
        key.push_str("||");
    }

    let title: String = md.title.chars().take(TITLE_PREFIX_CHARS).collect();
    key.push_str(&title.to_lowercase());
    key.push_str("||");
    key.push_str(&md.journal.to_lowercase());
    key.push_str("||");
    key.push_str(&md.year_text());
    key.push_str("||");
    key.push_str(&md.volume);
    key.push_str("||");
    key.push_str(&md.pages);
    key.push_str("||");
    key.push_str(&normalize_doi(&md.doi));

    format!("{:x}", Sha256::digest(key.as_bytes()))
}

/// First occurrence wins. Error entries and section headers never match.
pub fn find_duplicates(references: &[FormattedReference]) -> DuplicateMap {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut duplicates = DuplicateMap::new();

    for (i, reference) in references.iter().enumerate() {
        let Some(md) = reference.metadata() else {
            continue;
        };
        match seen.entry(fingerprint(md)) {
            Entry::Occupied(first) => {
                duplicates.insert(i, *first.get());
            }
            Entry::Vacant(slot) => {
                slot.insert(i);
            }
        }
    }
    duplicates
}

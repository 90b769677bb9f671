pub mod doi;
pub mod extract;

pub use doi::{normalize_doi, parse_doi};
pub use extract::{find_doi_in_text, is_section_header, strip_doi_tokens};

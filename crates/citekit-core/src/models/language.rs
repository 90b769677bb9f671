use serde::{Deserialize, Serialize};

/// Output language for labels and per-reference messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
}

impl Language {
    pub fn labels(self) -> &'static Labels {
        match self {
            Self::En => &EN_LABELS,
            Self::Ru => &RU_LABELS,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Self::En),
            "ru" | "russian" => Some(Self::Ru),
            _ => None,
        }
    }
}

/// Localized strings used by the formatters and the batch processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub volume: &'static str,
    pub issue: &'static str,
    pub page: &'static str,
    pub article: &'static str,
    pub no_pagination: &'static str,
    pub format_error: &'static str,
    pub doi_not_found: &'static str,
    pub metadata_unavailable: &'static str,
    pub could_not_format: &'static str,
    pub insert_doi_manually: &'static str,
    pub section_header_skipped: &'static str,
    pub duplicate_of: &'static str,
    pub needs_more_recent: &'static str,
    pub frequent_author: &'static str,
}

pub static EN_LABELS: Labels = Labels {
    volume: "Vol.",
    issue: "No.",
    page: "P.",
    article: "Art.",
    no_pagination: "[No pagination]",
    format_error: "Error: Could not format the reference.",
    doi_not_found: "[ERROR: DOI not found. Please check reference manually.]",
    metadata_unavailable: "[ERROR: Could not get metadata for DOI. Please check DOI manually.]",
    could_not_format: "[ERROR: Could not format reference. Please check DOI manually.]",
    insert_doi_manually: "Please check this source and insert the DOI manually.",
    section_header_skipped: "[SECTION HEADER - SKIPPED]",
    duplicate_of: "Duplicate of reference",
    needs_more_recent: "Fewer than 20% of references are from the last 4 years; consider adding more recent work.",
    frequent_author: "A single author accounts for more than 30% of references.",
};

pub static RU_LABELS: Labels = Labels {
    volume: "Т.",
    issue: "№",
    page: "С.",
    article: "Арт.",
    no_pagination: "[Без пагинации]",
    format_error: "Ошибка: Не удалось отформатировать ссылку.",
    doi_not_found: "[ОШИБКА: DOI не найден. Проверьте ссылку вручную.]",
    metadata_unavailable: "[ОШИБКА: Не удалось получить метаданные по DOI. Проверьте DOI вручную.]",
    could_not_format: "[ОШИБКА: Не удалось отформатировать ссылку. Проверьте DOI вручную.]",
    insert_doi_manually: "Проверьте источник и добавьте DOI вручную.",
    section_header_skipped: "[ЗАГОЛОВОК РАЗДЕЛА - ПРОПУЩЕН]",
    duplicate_of: "Дубликат ссылки",
    needs_more_recent: "Менее 20% ссылок за последние 4 года; рекомендуется добавить более свежие работы.",
    frequent_author: "Один автор встречается более чем в 30% ссылок.",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_language_names() {
        assert_eq!(Language::parse("EN"), Some(Language::En));
        assert_eq!(Language::parse(" russian "), Some(Language::Ru));
        assert_eq!(Language::parse("de"), None);
    }

    #[test]
    fn labels_follow_language() {
        assert_eq!(Language::En.labels().volume, "Vol.");
        assert_eq!(Language::Ru.labels().page, "С.");
    }
}

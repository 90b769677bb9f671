use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CitekitError, Result};

/// Maximum number of configurable elements in a custom style.
pub const MAX_ELEMENTS: usize = 8;

/// Version written into exported style envelopes.
pub const STYLE_ENVELOPE_VERSION: &str = "1.0";

// ─── Enumerations ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Numbering {
    #[default]
    #[serde(rename = "No numbering")]
    None,
    #[serde(rename = "1")]
    Plain,
    #[serde(rename = "1.")]
    Dot,
    #[serde(rename = "1)")]
    Paren,
    #[serde(rename = "(1)")]
    Parenthesized,
    #[serde(rename = "[1]")]
    Bracket,
}

impl Numbering {
    /// Prefix for the zero-based entry `index`.
    pub fn prefix(self, index: usize) -> String {
        let n = index + 1;
        match self {
            Self::None => String::new(),
            Self::Plain => format!("{n} "),
            Self::Dot => format!("{n}. "),
            Self::Paren => format!("{n}) "),
            Self::Parenthesized => format!("({n}) "),
            Self::Bracket => format!("[{n}] "),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthorFormat {
    #[default]
    #[serde(rename = "AA Smith")]
    InitialsSurname,
    #[serde(rename = "A.A. Smith")]
    DottedInitialsSurname,
    #[serde(rename = "Smith AA")]
    SurnameInitials,
    #[serde(rename = "Smith A.A")]
    SurnameDottedInitials,
    #[serde(rename = "Smith, A.A.")]
    SurnameCommaDottedInitials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoiFormat {
    #[default]
    #[serde(rename = "10.10/xxx")]
    Bare,
    #[serde(rename = "doi:10.10/xxx")]
    LowerPrefix,
    #[serde(rename = "DOI:10.10/xxx")]
    UpperPrefix,
    #[serde(rename = "https://dx.doi.org/10.10/xxx")]
    DxUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageFormat {
    #[serde(rename = "122 - 128")]
    SpacedHyphen,
    #[serde(rename = "122-128")]
    Hyphen,
    #[serde(rename = "122 – 128")]
    SpacedEnDash,
    #[default]
    #[serde(rename = "122–128")]
    EnDash,
    #[serde(rename = "122–8")]
    Abbreviated,
    #[serde(rename = "122")]
    FirstPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JournalStyle {
    #[default]
    #[serde(rename = "{Full Journal Name}")]
    Full,
    #[serde(rename = "{J. Abbr.}")]
    AbbreviatedDots,
    #[serde(rename = "{J Abbr}")]
    AbbreviatedNoDots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Authors,
    Title,
    Journal,
    Year,
    Volume,
    Issue,
    Pages,
    #[serde(rename = "DOI")]
    Doi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementConfig {
    pub italic: bool,
    pub bold: bool,
    pub parentheses: bool,
    pub separator: String,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            italic: false,
            bold: false,
            parentheses: false,
            separator: ". ".to_string(),
        }
    }
}

impl ElementConfig {
    pub fn separated(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            ..Default::default()
        }
    }
}

/// Fixed, non-configurable citation layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedStyle {
    Gost,
    Acs,
    Rsc,
    Cta,
}

impl NamedStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gost" => Some(Self::Gost),
            "acs" | "mdpi" => Some(Self::Acs),
            "rsc" => Some(Self::Rsc),
            "cta" => Some(Self::Cta),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Gost => "GOST",
            Self::Acs => "ACS (MDPI)",
            Self::Rsc => "RSC",
            Self::Cta => "CTA",
        }
    }
}

// ─── StyleConfig ────────────────────────────────────────────

/// Citation style for one processing run. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    #[serde(rename = "numbering_style")]
    pub numbering: Numbering,
    pub author_format: AuthorFormat,
    pub author_separator: String,
    /// 0 disables truncation.
    #[serde(deserialize_with = "null_as_zero")]
    pub et_al_limit: usize,
    #[serde(rename = "use_and_bool")]
    pub use_and: bool,
    #[serde(rename = "use_ampersand_bool")]
    pub use_ampersand: bool,
    pub doi_format: DoiFormat,
    pub doi_hyperlink: bool,
    pub page_format: PageFormat,
    #[serde(deserialize_with = "flag_or_legacy_string")]
    pub final_punctuation: bool,
    pub journal_style: JournalStyle,
    pub elements: Vec<(ElementKind, ElementConfig)>,
    pub gost_style: bool,
    pub acs_style: bool,
    pub rsc_style: bool,
    pub cta_style: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            numbering: Numbering::None,
            author_format: AuthorFormat::InitialsSurname,
            author_separator: ", ".to_string(),
            et_al_limit: 0,
            use_and: false,
            use_ampersand: false,
            doi_format: DoiFormat::Bare,
            doi_hyperlink: true,
            page_format: PageFormat::EnDash,
            final_punctuation: false,
            journal_style: JournalStyle::Full,
            elements: Vec::new(),
            gost_style: false,
            acs_style: false,
            rsc_style: false,
            cta_style: false,
        }
    }
}

impl StyleConfig {
    /// Preset configuration for one of the named styles.
    pub fn preset(style: NamedStyle) -> Self {
        let base = Self::default();
        match style {
            NamedStyle::Gost => Self {
                author_format: AuthorFormat::SurnameCommaDottedInitials,
                doi_format: DoiFormat::DxUrl,
                gost_style: true,
                ..base
            },
            NamedStyle::Acs => Self {
                author_format: AuthorFormat::SurnameCommaDottedInitials,
                author_separator: "; ".to_string(),
                final_punctuation: true,
                journal_style: JournalStyle::AbbreviatedDots,
                acs_style: true,
                ..base
            },
            NamedStyle::Rsc => Self {
                author_format: AuthorFormat::DottedInitialsSurname,
                use_and: true,
                page_format: PageFormat::FirstPage,
                final_punctuation: true,
                journal_style: JournalStyle::AbbreviatedDots,
                rsc_style: true,
                ..base
            },
            NamedStyle::Cta => Self {
                author_format: AuthorFormat::SurnameInitials,
                doi_format: DoiFormat::LowerPrefix,
                page_format: PageFormat::Abbreviated,
                journal_style: JournalStyle::AbbreviatedNoDots,
                cta_style: true,
                ..base
            },
        }
    }

    /// A ready-to-use custom element style: `Authors. Title. Journal. Year, Volume(Issue), Pages. DOI`.
    pub fn default_custom() -> Self {
        Self {
            final_punctuation: true,
            elements: vec![
                (ElementKind::Authors, ElementConfig::separated(". ")),
                (ElementKind::Title, ElementConfig::separated(". ")),
                (
                    ElementKind::Journal,
                    ElementConfig {
                        italic: true,
                        ..ElementConfig::separated(". ")
                    },
                ),
                (
                    ElementKind::Year,
                    ElementConfig {
                        bold: true,
                        ..ElementConfig::separated(", ")
                    },
                ),
                (ElementKind::Volume, ElementConfig::separated("")),
                (
                    ElementKind::Issue,
                    ElementConfig {
                        parentheses: true,
                        ..ElementConfig::separated(", ")
                    },
                ),
                (ElementKind::Pages, ElementConfig::separated(". ")),
                (ElementKind::Doi, ElementConfig::separated("")),
            ],
            ..Self::default()
        }
    }

    /// The active named style, if any. Call [`StyleConfig::validate`] first.
    pub fn named_style(&self) -> Option<NamedStyle> {
        if self.gost_style {
            Some(NamedStyle::Gost)
        } else if self.acs_style {
            Some(NamedStyle::Acs)
        } else if self.rsc_style {
            Some(NamedStyle::Rsc)
        } else if self.cta_style {
            Some(NamedStyle::Cta)
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<()> {
        let named = [self.gost_style, self.acs_style, self.rsc_style, self.cta_style]
            .iter()
            .filter(|flag| **flag)
            .count();
        if named > 1 {
            return Err(CitekitError::InvalidStyle(
                "at most one named style (GOST/ACS/RSC/CTA) may be enabled".to_string(),
            ));
        }
        if self.use_and && self.use_ampersand {
            return Err(CitekitError::InvalidStyle(
                "\"and\" and \"&\" joiners are mutually exclusive".to_string(),
            ));
        }
        // Named styles never render the element list.
        if named == 1 {
            return Ok(());
        }
        if self.elements.len() > MAX_ELEMENTS {
            return Err(CitekitError::InvalidStyle(format!(
                "a custom style holds at most {MAX_ELEMENTS} elements, got {}",
                self.elements.len()
            )));
        }
        for (i, (kind, _)) in self.elements.iter().enumerate() {
            if self.elements[..i].iter().any(|(seen, _)| seen == kind) {
                return Err(CitekitError::InvalidStyle(format!(
                    "element {kind:?} appears more than once"
                )));
            }
        }
        Ok(())
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<usize>::deserialize(deserializer)?.unwrap_or(0))
}

/// Accepts `true`/`false` or the older `""`/`"."` string form.
fn flag_or_legacy_string<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagOrString {
        Flag(bool),
        Text(String),
    }

    Ok(match FlagOrString::deserialize(deserializer)? {
        FlagOrString::Flag(flag) => flag,
        FlagOrString::Text(text) => !text.trim().is_empty(),
    })
}

// ─── Import / Export envelope ───────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleEnvelope {
    pub version: String,
    pub export_date: String,
    pub style_config: StyleConfig,
}

/// Serialize `style` into the versioned JSON envelope.
pub fn export_style(style: &StyleConfig, now: DateTime<Local>) -> Result<String> {
    let envelope = StyleEnvelope {
        version: STYLE_ENVELOPE_VERSION.to_string(),
        export_date: now.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        style_config: style.clone(),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Parse a style envelope. Nothing is applied unless the whole style is valid.
pub fn import_style(json: &str) -> Result<StyleConfig> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| CitekitError::StyleImport(format!("malformed JSON: {e}")))?;

    let Some(raw_style) = value.get("style_config") else {
        return Err(CitekitError::StyleImport(
            "missing `style_config` key".to_string(),
        ));
    };

    let style: StyleConfig = serde_json::from_value(raw_style.clone())
        .map_err(|e| CitekitError::StyleImport(format!("invalid style_config: {e}")))?;
    style
        .validate()
        .map_err(|e| CitekitError::StyleImport(e.to_string()))?;
    Ok(style)
}

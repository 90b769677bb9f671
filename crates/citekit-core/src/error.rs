use thiserror::Error;

/// All errors that can occur in citekit-core.
#[derive(Debug, Error)]
pub enum CitekitError {
    #[error("Style import error: {0}")]
    StyleImport(String),

    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Exit codes used by the citekit binary. Other errors exit with 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    NotFound = 2,
    InvalidArgs = 3,
    FileSystemError = 4,
}

pub type Result<T> = std::result::Result<T, CitekitError>;

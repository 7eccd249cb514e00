//! Error types for label resolution and configuration

use thiserror::Error;

/// Everything that can go wrong while registering sources, configuring or translating.
///
/// Errors are `Clone` because a single configuration run hands the same outcome to every
/// caller that joined it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum I18nError {
    /// Language tag is missing, empty or not a string
    #[error("invalid language: it must be a non-empty string")]
    InvalidLanguage,

    /// Label is empty
    #[error("invalid label: it must be a non-empty string")]
    InvalidLabel,

    /// Parameters were supplied but are not an array
    #[error("invalid parameters for label \"{label}\": they must be an array")]
    InvalidParameters { label: String },

    /// Translation document is not a JSON object
    #[error("invalid translation{}: it must be a non-null object", describe_origin(.origin))]
    InvalidTranslation { origin: Option<String> },

    /// Translation URL is missing, empty or not a string
    #[error("invalid translation URL: it must be a non-empty URL string")]
    InvalidUrl,

    /// Extend flag was supplied but is not a boolean
    #[error("invalid extend flag: it must be a boolean")]
    InvalidExtendFlag,

    /// The entry for a label exists but is not a string
    #[error("value for label \"{label}\" is not a string")]
    InvalidValue { label: String },

    /// Remote translation could not be fetched
    #[error("error fetching translation from \"{url}\": {reason}")]
    FetchFailed { url: String, reason: String },

    /// Local translation file or directory could not be read or parsed
    #[error("error reading translation from \"{path}\": {reason}")]
    ReadFailed { path: String, reason: String },

    /// No language has ever been configured
    #[error("the current language is not configured")]
    LanguageNotConfigured,

    /// The current language has no entry for the label
    #[error("no message found for label \"{label}\"")]
    LabelNotFound { label: String },

    /// One or more pending requests failed during configuration
    #[error("configuration failed: {}", join_reasons(.0))]
    ConfigurationFailed(Vec<I18nError>),

    /// The HTTP client backing a fetcher could not be created
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

impl I18nError {
    /// Reasons carried by an aggregate failure, or the error itself otherwise
    pub fn reasons(&self) -> &[I18nError] {
        match self {
            I18nError::ConfigurationFailed(reasons) => reasons,
            other => std::slice::from_ref(other),
        }
    }
}

fn describe_origin(origin: &Option<String>) -> String {
    match origin {
        Some(origin) => format!(" from \"{}\"", origin),
        None => String::new(),
    }
}

fn join_reasons(reasons: &[I18nError]) -> String {
    reasons
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for label-i18n operations
pub type I18nResult<T> = Result<T, I18nError>;

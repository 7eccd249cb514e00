//! Shape checks for everything a caller can hand to a [`crate::Translator`]
//!
//! Validators work on `serde_json::Value` so that typed inputs and dynamically typed
//! inputs (manifests, JSON given on the command line) go through the same rules.
//! Each one either returns the accepted value in its typed form or the error that
//! describes the first rule it broke.

use crate::error::{I18nError, I18nResult};
use crate::queue::MergeMode;
use crate::table::TranslationDocument;
use serde_json::Value;

/// A non-empty JSON string
pub fn is_string_value(value: &Value) -> bool {
    matches!(value, Value::String(s) if !s.is_empty())
}

fn string_value(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|_| is_string_value(value))
        .map(str::to_string)
}

/// Validate a language tag
///
/// # Example
///
/// ```ignore
/// assert_eq!(language(&json!("en"))?, "en");
/// assert!(language(&json!("")).is_err());
/// ```
pub fn language(value: &Value) -> I18nResult<String> {
    string_value(value).ok_or(I18nError::InvalidLanguage)
}

/// Validate a lookup label
pub fn label(label: &str) -> I18nResult<()> {
    if label.is_empty() {
        return Err(I18nError::InvalidLabel);
    }
    Ok(())
}

/// Validate a translation document; only JSON objects qualify
pub fn translation(value: Value, origin: Option<&str>) -> I18nResult<TranslationDocument> {
    match value {
        Value::Object(document) => Ok(document),
        _ => Err(I18nError::InvalidTranslation {
            origin: origin.map(str::to_string),
        }),
    }
}

/// Validate a translation URL
pub fn url(value: &Value) -> I18nResult<String> {
    string_value(value).ok_or(I18nError::InvalidUrl)
}

/// Validate an optional extend flag; absence means [`MergeMode::Replace`]
pub fn extend_flag(value: Option<&Value>) -> I18nResult<MergeMode> {
    match value {
        None => Ok(MergeMode::Replace),
        Some(Value::Bool(extend)) => Ok(MergeMode::from_extend(*extend)),
        Some(_) => Err(I18nError::InvalidExtendFlag),
    }
}

/// Validate interpolation parameters and convert them to their string forms
///
/// Strings are taken verbatim, every other JSON value is rendered as JSON text.
pub fn parameters(label: &str, value: &Value) -> I18nResult<Vec<String>> {
    match value {
        Value::Array(items) => Ok(items.iter().map(parameter_text).collect()),
        _ => Err(I18nError::InvalidParameters {
            label: label.to_string(),
        }),
    }
}

fn parameter_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

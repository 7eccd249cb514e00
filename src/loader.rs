use crate::config::Manifest;
use crate::error::{I18nError, I18nResult};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

fn read_failed(path: &Path, reason: impl Into<String>) -> I18nError {
    I18nError::ReadFailed {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

/// Load a translation document from a single JSON file
///
/// The JSON file should have the following structure:
/// ```json
/// {
///     "GREETING": "Hello, {0}!",
///     "FAREWELL": "Goodbye, {0}!"
/// }
/// ```
///
/// The parsed value is returned as-is; checking that it is an object is left to the
/// caller so that a wrong shape is reported as an invalid translation.
///
/// # Errors
/// - File not found or unreadable
/// - Invalid JSON
pub fn load_document(path: &Path) -> I18nResult<Value> {
    let content = fs::read_to_string(path).map_err(|e| read_failed(path, e.to_string()))?;

    serde_json::from_str(&content).map_err(|e| read_failed(path, format!("invalid JSON: {}", e)))
}

/// List the translation files of a directory
///
/// Every `*.json` file is returned with its stem as the language tag, e.g.
/// `en.json` -> `"en"`, `zh-hans.json` -> `"zh-hans"`. Entries are sorted by file
/// name so registration order does not depend on the file system.
pub fn document_files(dir: &Path) -> I18nResult<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Err(read_failed(dir, "not a directory"));
    }

    let entries = fs::read_dir(dir).map_err(|e| read_failed(dir, e.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| read_failed(dir, e.to_string()))?.path();

        // Only process JSON files
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let Some(language) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        files.push((language.to_string(), path.clone()));
    }

    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// Load a manifest; relative `file` entries resolve against the manifest's directory
pub fn load_manifest(path: &Path) -> I18nResult<Manifest> {
    let content = fs::read_to_string(path).map_err(|e| read_failed(path, e.to_string()))?;

    let mut manifest: Manifest = serde_json::from_str(&content)
        .map_err(|e| read_failed(path, format!("invalid manifest: {}", e)))?;
    manifest.base_dir = path.parent().map(Path::to_path_buf);
    Ok(manifest)
}

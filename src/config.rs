//! Runtime settings and translation manifests

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Settings shared by every fetch a session issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Upper bound for a single remote fetch, transport included
    pub fetch_timeout: Duration,
    /// User-Agent header sent with remote fetches
    pub user_agent: String,
}

impl Settings {
    pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

    /// Read settings from `I18N_FETCH_TIMEOUT_SECS` and `I18N_USER_AGENT`
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            fetch_timeout: lookup("I18N_FETCH_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            user_agent: lookup("I18N_USER_AGENT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.user_agent),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(Self::DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

/// A full set of registrations, usually read from a JSON file
///
/// ```json
/// {
///     "language": "en",
///     "translations": [
///         { "language": "en", "document": { "GREETING": "Hello, {0}!" } },
///         { "language": "en", "file": "en-extra.json", "extend": true },
///         { "language": "fr", "url": "https://example.com/i18n" }
///     ]
/// }
/// ```
///
/// Fields keep their raw JSON form so that a wrongly typed entry becomes a deferred
/// validation failure of that one request instead of rejecting the whole manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default, deserialize_with = "present")]
    pub language: Option<Value>,
    #[serde(default)]
    pub translations: Vec<SourceSpec>,
    /// Directory relative `file` entries are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Manifest {
    /// Resolve a manifest `file` entry to a path
    pub fn resolve_path(&self, file: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if file.is_relative() => base.join(file),
            _ => file.to_path_buf(),
        }
    }
}

/// One translation registration from a manifest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceSpec {
    #[serde(default)]
    pub language: Value,
    #[serde(default, deserialize_with = "present")]
    pub document: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub url: Option<Value>,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default, deserialize_with = "present")]
    pub extend: Option<Value>,
}

/// A key that is present keeps its value, `null` included; only a missing key is `None`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Where a [`SourceSpec`] takes its document from
#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind<'a> {
    Remote(&'a Value),
    File(&'a Path),
    Literal(&'a Value),
}

impl SourceSpec {
    /// `url` wins over `file`, which wins over `document`; a source with none of them is
    /// a literal `null` document and fails validation
    pub fn kind(&self) -> SourceKind<'_> {
        if let Some(url) = &self.url {
            SourceKind::Remote(url)
        } else if let Some(file) = &self.file {
            SourceKind::File(file)
        } else {
            SourceKind::Literal(self.document.as_ref().unwrap_or(&Value::Null))
        }
    }
}

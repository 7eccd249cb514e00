use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::events::ConfigEvent;
use crate::queue::{MergeMode, ResolvedTranslation};

/// Messages for one language, keyed by label.
///
/// Values are usually template strings, but nested structure is kept as-is and only
/// rejected when a lookup lands on it.
pub type TranslationDocument = Map<String, Value>;

/// All known documents, keyed by language tag
///
/// e.g. table["en"]["GREETING"] = "Hello, {0}!"
///      table["fr"]["GREETING"] = "Bonjour, {0} !"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationTable(HashMap<String, TranslationDocument>);

impl TranslationTable {
    pub fn new() -> Self {
        TranslationTable(HashMap::new())
    }

    pub fn document(&self, language: &str) -> Option<&TranslationDocument> {
        self.0.get(language)
    }

    pub fn lookup(&self, language: &str, label: &str) -> Option<&Value> {
        self.0.get(language).and_then(|document| document.get(label))
    }

    /// Languages with a document, sorted
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.0.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Discard whatever is stored for `language` and store `document` instead
    pub fn replace(&mut self, language: &str, document: TranslationDocument) {
        self.0.insert(language.to_string(), document);
    }

    /// Overlay `document` onto the one stored for `language`
    ///
    /// Keys present in `document` overwrite, keys absent from it are kept.
    pub fn extend(&mut self, language: &str, document: TranslationDocument) {
        self.0
            .entry(language.to_string())
            .or_default()
            .extend(document);
    }

    /// Apply one resolved request and describe what changed
    pub fn apply(&mut self, resolved: ResolvedTranslation) -> ConfigEvent {
        let labels = resolved.document.len();
        match resolved.mode {
            MergeMode::Replace => {
                self.replace(&resolved.language, resolved.document);
                ConfigEvent::TranslationReplaced {
                    language: resolved.language,
                    labels,
                }
            }
            MergeMode::Extend => {
                self.extend(&resolved.language, resolved.document);
                ConfigEvent::TranslationExtended {
                    language: resolved.language,
                    labels,
                }
            }
        }
    }
}

//! The translation session handle
//!
//! A [`Translator`] owns one translation table, the current language and the queue of
//! pending registrations. Its lifecycle is: build, register sources, configure,
//! translate; registering more sources later and configuring again is allowed at any
//! point. Handles are cheap to clone and every clone sees the same session, while
//! separately built translators are fully independent.
//!
//! # Example
//!
//! ```ignore
//! use label_i18n::{MergeMode, Translator};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let translator = Translator::new()?;
//!     translator
//!         .language("en")
//!         .translation("en", json!({"GREETING": "Hello, {0}!"}), MergeMode::Replace)
//!         .translation_url("en", "https://example.com/i18n", MergeMode::Extend);
//!
//!     translator.configure().await?;
//!     println!("{}", translator.translate_with("GREETING", &["World"]).await?);
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{Manifest, Settings, SourceKind, SourceSpec};
use crate::error::{I18nError, I18nResult};
use crate::events::{ConfigEvent, Notifier, Observer};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::interpolate::{interpolate, placeholder_indices};
use crate::loader;
use crate::pipeline::{self, SessionState};
use crate::queue::{MergeMode, RequestQueue};
use crate::table::TranslationDocument;
use crate::validate;

type ConfigureRun = Shared<BoxFuture<'static, I18nResult<()>>>;

struct Inner {
    state: RwLock<SessionState>,
    queue: Mutex<RequestQueue>,
    /// The configuration run in flight, shared by everyone waiting on it
    run: Mutex<Option<ConfigureRun>>,
    fetcher: Arc<dyn Fetcher>,
    settings: Settings,
    notifier: Notifier,
}

/// Builder for a [`Translator`]
#[derive(Default)]
pub struct TranslatorBuilder {
    settings: Option<Settings>,
    fetcher: Option<Arc<dyn Fetcher>>,
    observer: Option<Observer>,
}

impl TranslatorBuilder {
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Use `fetcher` for remote sources instead of the default [`HttpFetcher`]
    pub fn fetcher<F: Fetcher + 'static>(mut self, fetcher: F) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn shared_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Receive every [`ConfigEvent`] of every configuration run, in order
    pub fn observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&ConfigEvent) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// # Errors
    ///
    /// `I18nError::HttpClient` if no fetcher was given and the HTTP client cannot be built
    pub fn build(self) -> I18nResult<Translator> {
        let settings = self.settings.unwrap_or_default();
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(&settings)?),
        };

        Ok(Translator {
            inner: Arc::new(Inner {
                state: RwLock::new(SessionState::default()),
                queue: Mutex::new(RequestQueue::new()),
                run: Mutex::new(None),
                fetcher,
                settings,
                notifier: Notifier::new(self.observer),
            }),
        })
    }
}

/// Handle to one translation session
#[derive(Clone)]
pub struct Translator {
    inner: Arc<Inner>,
}

impl Translator {
    /// A translator with default [`Settings`] and an HTTP fetcher
    pub fn new() -> I18nResult<Self> {
        Self::builder().build()
    }

    pub fn builder() -> TranslatorBuilder {
        TranslatorBuilder::default()
    }

    fn queue(&self) -> MutexGuard<'_, RequestQueue> {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn run_slot(&self) -> MutexGuard<'_, Option<ConfigureRun>> {
        self.inner.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========== Registration ==========

    /// Request `language` as the current language, replacing any pending request
    pub fn language(&self, language: &str) -> &Self {
        self.queue().set_language(&Value::from(language));
        self
    }

    /// Register a literal translation document for `language`
    ///
    /// `document` must be a JSON object; anything else fails when configured.
    pub fn translation(&self, language: &str, document: Value, mode: MergeMode) -> &Self {
        self.queue()
            .push_document(&Value::from(language), document, Some(&mode_flag(mode)));
        self
    }

    /// Register a remote translation document; the fetch starts immediately
    pub fn translation_url(&self, language: &str, url: &str, mode: MergeMode) -> &Self {
        self.queue().push_remote(
            &Value::from(language),
            &Value::from(url),
            Some(&mode_flag(mode)),
            Arc::clone(&self.inner.fetcher),
            self.inner.settings.fetch_timeout,
        );
        self
    }

    /// Register the JSON document stored at `path`
    pub fn translation_file(&self, language: &str, path: impl AsRef<Path>, mode: MergeMode) -> &Self {
        self.queue()
            .push_file(&Value::from(language), path.as_ref(), Some(&mode_flag(mode)));
        self
    }

    /// Register every `<language>.json` file of `dir`, in file name order
    pub fn translation_dir(&self, dir: impl AsRef<Path>, mode: MergeMode) -> &Self {
        let flag = mode_flag(mode);
        let mut queue = self.queue();
        match loader::document_files(dir.as_ref()) {
            Ok(files) => {
                for (language, path) in files {
                    queue.push_file(&Value::from(language), &path, Some(&flag));
                }
            }
            Err(e) => queue.push_failure(e),
        }
        self
    }

    /// Register one manifest entry; a relative `file` resolves against the working directory
    pub fn register(&self, source: &SourceSpec) -> &Self {
        self.register_from(source, None)
    }

    /// Register everything a manifest describes
    pub fn apply_manifest(&self, manifest: &Manifest) -> &Self {
        if let Some(language) = &manifest.language {
            self.queue().set_language(language);
        }
        for source in &manifest.translations {
            self.register_from(source, Some(manifest));
        }
        self
    }

    fn register_from(&self, source: &SourceSpec, manifest: Option<&Manifest>) -> &Self {
        let extend = source.extend.as_ref();
        match source.kind() {
            SourceKind::Remote(url) => self.queue().push_remote(
                &source.language,
                url,
                extend,
                Arc::clone(&self.inner.fetcher),
                self.inner.settings.fetch_timeout,
            ),
            SourceKind::File(file) => {
                let path = match manifest {
                    Some(manifest) => manifest.resolve_path(file),
                    None => file.to_path_buf(),
                };
                self.queue().push_file(&source.language, &path, extend)
            }
            SourceKind::Literal(document) => {
                self.queue()
                    .push_document(&source.language, document.clone(), extend)
            }
        }
        self
    }

    // ========== Inspection ==========

    /// Requests waiting for the next configuration run
    pub fn pending_requests(&self) -> usize {
        self.queue().len()
    }

    pub fn is_configuring(&self) -> bool {
        self.run_slot().is_some()
    }

    pub fn current_language(&self) -> Option<String> {
        self.state().current_language.clone()
    }

    /// Languages with a translation document, sorted
    pub fn languages(&self) -> Vec<String> {
        self.state()
            .table
            .languages()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn document(&self, language: &str) -> Option<TranslationDocument> {
        self.state().table.document(language).cloned()
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    // ========== Configuration ==========

    /// Apply every pending request to the table
    ///
    /// Calls made while a run is in flight join that run and observe its outcome. An
    /// empty queue is a successful no-op.
    ///
    /// # Errors
    ///
    /// `I18nError::ConfigurationFailed` with the reason of every request that failed;
    /// all other requests were still applied.
    pub async fn configure(&self) -> I18nResult<()> {
        let run = {
            let mut slot = self.run_slot();
            match slot.clone() {
                Some(run) => {
                    debug!("joining configuration run in flight");
                    run
                }
                None => {
                    let batch = self.queue().take();
                    if batch.is_empty() {
                        return Ok(());
                    }
                    let inner = Arc::clone(&self.inner);
                    let run = async move {
                        let result =
                            pipeline::drain(batch, &inner.state, &inner.notifier).await;
                        inner.run.lock().unwrap_or_else(PoisonError::into_inner).take();
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(run.clone());
                    run
                }
            }
        };
        run.await
    }

    fn needs_configure(&self) -> bool {
        self.is_configuring() || !self.queue().is_empty()
    }

    /// Bring the table up to date before a lookup
    ///
    /// A run already in flight is joined first; requests registered after it started
    /// get a run of their own.
    async fn ensure_configured(&self) {
        for _ in 0..2 {
            if !self.needs_configure() {
                break;
            }
            if let Err(e) = self.configure().await {
                warn!(error = %e, "configuration before lookup failed");
            }
        }
    }

    // ========== Lookup ==========

    /// Translate `label` without parameters
    pub async fn translate(&self, label: &str) -> I18nResult<String> {
        self.translate_value(label, None).await
    }

    /// Translate `label`, substituting `parameters[i]` for every `{i}`
    pub async fn translate_with<P: ToString>(
        &self,
        label: &str,
        parameters: &[P],
    ) -> I18nResult<String> {
        let parameters: Vec<String> = parameters.iter().map(ToString::to_string).collect();
        self.ensure_configured().await;
        let template = self.template(label)?;
        Ok(render(label, &template, &parameters))
    }

    /// Translate `label` with parameters given as a JSON value
    ///
    /// # Errors
    ///
    /// In order: `InvalidLabel`, `LanguageNotConfigured`, `LabelNotFound`,
    /// `InvalidValue`, then `InvalidParameters` if `parameters` is not an array.
    pub async fn translate_value(
        &self,
        label: &str,
        parameters: Option<&Value>,
    ) -> I18nResult<String> {
        self.ensure_configured().await;
        let template = self.template(label)?;
        match parameters {
            None => Ok(template),
            Some(value) => {
                let parameters = validate::parameters(label, value)?;
                Ok(render(label, &template, &parameters))
            }
        }
    }

    fn template(&self, label: &str) -> I18nResult<String> {
        validate::label(label)?;

        let state = self.state();
        let language = state
            .current_language
            .as_deref()
            .ok_or(I18nError::LanguageNotConfigured)?;

        match state.table.lookup(language, label) {
            Some(Value::String(template)) if !template.is_empty() => Ok(template.clone()),
            // an empty message counts as missing
            Some(Value::String(_)) | None => Err(I18nError::LabelNotFound {
                label: label.to_string(),
            }),
            Some(_) => Err(I18nError::InvalidValue {
                label: label.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("current_language", &self.current_language())
            .field("languages", &self.languages())
            .field("pending_requests", &self.pending_requests())
            .field("fetcher", &self.inner.fetcher.fetcher_name())
            .finish()
    }
}

fn mode_flag(mode: MergeMode) -> Value {
    Value::Bool(mode == MergeMode::Extend)
}

fn render(label: &str, template: &str, parameters: &[String]) -> String {
    let unresolved = placeholder_indices(template)
        .into_iter()
        .filter(|index| *index >= parameters.len())
        .count();
    if unresolved > 0 {
        debug!(label, unresolved, "placeholders left without a parameter");
    }
    interpolate(template, parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{MockFetcher, MockMode};
    use serde_json::json;

    fn translator() -> Translator {
        Translator::builder()
            .fetcher(MockFetcher::new(MockMode::Echo))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_translate_verbatim() {
        let t = translator();
        t.language("en")
            .translation("en", json!({"GREETING": "Hello!"}), MergeMode::Replace);

        t.configure().await.unwrap();
        assert_eq!(t.translate("GREETING").await.unwrap(), "Hello!");
        assert_eq!(t.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_translate_triggers_configure() {
        let t = translator();
        t.language("en")
            .translation("en", json!({"GREETING": "Hello, {0}!"}), MergeMode::Replace);
        assert_eq!(t.pending_requests(), 2);

        assert_eq!(
            t.translate_with("GREETING", &["World"]).await.unwrap(),
            "Hello, World!"
        );
        assert_eq!(t.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_language_not_configured() {
        let t = translator();
        assert_eq!(
            t.translate("GREETING").await,
            Err(I18nError::LanguageNotConfigured)
        );

        t.translation("en", json!({"GREETING": "Hi"}), MergeMode::Replace);
        assert_eq!(
            t.translate("GREETING").await,
            Err(I18nError::LanguageNotConfigured)
        );
    }

    #[tokio::test]
    async fn test_lookup_error_order() {
        let t = translator();
        assert_eq!(t.translate("").await, Err(I18nError::InvalidLabel));

        t.language("en").translation(
            "en",
            json!({"NESTED": {"inner": "x"}, "COUNT": 3, "OK": "ok"}),
            MergeMode::Replace,
        );
        t.configure().await.unwrap();

        assert_eq!(
            t.translate("MISSING").await,
            Err(I18nError::LabelNotFound {
                label: "MISSING".to_string()
            })
        );
        assert_eq!(
            t.translate("NESTED").await,
            Err(I18nError::InvalidValue {
                label: "NESTED".to_string()
            })
        );
        assert_eq!(
            t.translate("COUNT").await,
            Err(I18nError::InvalidValue {
                label: "COUNT".to_string()
            })
        );
        assert_eq!(
            t.translate_value("OK", Some(&json!("not an array"))).await,
            Err(I18nError::InvalidParameters {
                label: "OK".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_empty_message_is_not_found() {
        let t = translator();
        t.language("en")
            .translation("en", json!({"BLANK": "", "SPACE": " "}), MergeMode::Replace);

        assert_eq!(
            t.translate("BLANK").await,
            Err(I18nError::LabelNotFound {
                label: "BLANK".to_string()
            })
        );
        assert_eq!(t.translate("SPACE").await.unwrap(), " ");
    }

    #[tokio::test]
    async fn test_language_without_document() {
        let t = translator();
        t.language("de");
        t.configure().await.unwrap();
        assert_eq!(t.current_language().as_deref(), Some("de"));
        assert!(matches!(
            t.translate("A").await,
            Err(I18nError::LabelNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_translate_value_parameters() {
        let t = translator();
        t.language("en").translation(
            "en",
            json!({"ITEMS": "{0} has { 1 } items"}),
            MergeMode::Replace,
        );
        assert_eq!(
            t.translate_value("ITEMS", Some(&json!(["Cart", 3]))).await.unwrap(),
            "Cart has 3 items"
        );
        assert_eq!(
            t.translate_value("ITEMS", Some(&json!([]))).await.unwrap(),
            "{0} has { 1 } items"
        );
    }

    #[tokio::test]
    async fn test_empty_configure_is_noop() {
        let t = translator();
        assert!(t.configure().await.is_ok());
        assert!(!t.is_configuring());

        t.language("en");
        t.configure().await.unwrap();
        assert!(t.configure().await.is_ok());
        assert_eq!(t.current_language().as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_switch_language() {
        let t = translator();
        t.language("en")
            .translation("en", json!({"HI": "Hello"}), MergeMode::Replace)
            .translation("fr", json!({"HI": "Bonjour"}), MergeMode::Replace);
        assert_eq!(t.translate("HI").await.unwrap(), "Hello");

        t.language("fr");
        assert_eq!(t.translate("HI").await.unwrap(), "Bonjour");
        assert_eq!(t.languages(), vec!["en", "fr"]);
    }

    #[tokio::test]
    async fn test_remote_source_through_session() {
        let t = translator();
        t.language("fr")
            .translation_url("fr", "mock://fr", MergeMode::Replace);
        assert_eq!(t.translate("url").await.unwrap(), "mock://fr");
        assert_eq!(t.translate("language").await.unwrap(), "fr");
    }

    #[tokio::test]
    async fn test_failed_configuration_still_allows_lookup() {
        let t = translator();
        t.language("en")
            .translation("en", json!({"A": "a"}), MergeMode::Replace)
            .translation("", json!({"B": "b"}), MergeMode::Replace);

        assert_eq!(t.translate("A").await.unwrap(), "a");
        assert_eq!(t.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let first = translator();
        let second = translator();
        first
            .language("en")
            .translation("en", json!({"A": "a"}), MergeMode::Replace);
        first.configure().await.unwrap();

        assert_eq!(second.current_language(), None);
        assert_eq!(
            second.translate("A").await,
            Err(I18nError::LanguageNotConfigured)
        );

        // clones share the session
        let clone = first.clone();
        assert_eq!(clone.translate("A").await.unwrap(), "a");
    }

    #[test]
    fn test_debug_output() {
        let t = translator();
        t.language("en");
        let debug = format!("{:?}", t);
        assert!(debug.contains("pending_requests: 1"));
        assert!(debug.contains("Mock"));
    }
}

//! Pending registrations waiting for the next configuration run
//!
//! Every registration is validated when it is made but never fails the caller: the
//! outcome, success or failure, is stored and only surfaces when the pipeline drains
//! it. Remote registrations start fetching right away on the ambient tokio runtime,
//! so independent sources download concurrently while the drain still applies them
//! in registration order.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::debug;

use crate::error::{I18nError, I18nResult};
use crate::fetch::Fetcher;
use crate::loader;
use crate::table::TranslationDocument;
use crate::validate;

/// How a translation document is combined with the one already stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeMode {
    /// Discard the stored document
    #[default]
    Replace,
    /// Overlay onto the stored document, keeping keys the new one lacks
    Extend,
}

impl MergeMode {
    pub fn from_extend(extend: bool) -> Self {
        if extend {
            MergeMode::Extend
        } else {
            MergeMode::Replace
        }
    }
}

/// A translation request whose outcome was a valid document
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTranslation {
    pub language: String,
    pub document: TranslationDocument,
    pub mode: MergeMode,
}

enum Outcome {
    Ready(I18nResult<ResolvedTranslation>),
    Fetching(BoxFuture<'static, I18nResult<ResolvedTranslation>>),
}

/// One queued translation request
pub struct PendingTranslation {
    outcome: Outcome,
}

impl PendingTranslation {
    pub fn ready(result: I18nResult<ResolvedTranslation>) -> Self {
        Self {
            outcome: Outcome::Ready(result),
        }
    }

    /// Whether the outcome is known without waiting on a fetch
    pub fn is_ready(&self) -> bool {
        matches!(self.outcome, Outcome::Ready(_))
    }

    /// Wait for the outcome
    pub async fn resolve(self) -> I18nResult<ResolvedTranslation> {
        match self.outcome {
            Outcome::Ready(result) => result,
            Outcome::Fetching(fetch) => fetch.await,
        }
    }
}

impl std::fmt::Debug for PendingTranslation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            Outcome::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Outcome::Fetching(_) => f.write_str("Fetching"),
        }
    }
}

/// The pending language request and translation requests, in registration order
#[derive(Debug, Default)]
pub struct RequestQueue {
    language: Option<I18nResult<String>>,
    translations: Vec<PendingTranslation>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a language change, overwriting any pending one
    pub fn set_language(&mut self, language: &Value) {
        self.language = Some(validate::language(language));
    }

    /// Queue a literal document
    pub fn push_document(&mut self, language: &Value, document: Value, extend: Option<&Value>) {
        let result = validate::language(language).and_then(|language| {
            let document = validate::translation(document, None)?;
            let mode = validate::extend_flag(extend)?;
            Ok(ResolvedTranslation {
                language,
                document,
                mode,
            })
        });
        self.push(PendingTranslation::ready(result));
    }

    /// Queue a document read from a JSON file
    ///
    /// The file is read now; a read error is stored like any other failure.
    pub fn push_file(&mut self, language: &Value, path: &Path, extend: Option<&Value>) {
        let origin = path.display().to_string();
        let result = validate::language(language).and_then(|language| {
            let value = loader::load_document(path)?;
            let document = validate::translation(value, Some(&origin))?;
            let mode = validate::extend_flag(extend)?;
            Ok(ResolvedTranslation {
                language,
                document,
                mode,
            })
        });
        self.push(PendingTranslation::ready(result));
    }

    /// Queue a remote document
    ///
    /// When the registration is valid the fetch starts immediately, bounded by
    /// `timeout`. Outside a tokio runtime the fetch is deferred until it is drained.
    pub fn push_remote(
        &mut self,
        language: &Value,
        url: &Value,
        extend: Option<&Value>,
        fetcher: Arc<dyn Fetcher>,
        timeout: Duration,
    ) {
        let validated = validate::language(language).and_then(|language| {
            let url = validate::url(url)?;
            let mode = validate::extend_flag(extend)?;
            Ok((language, url, mode))
        });

        let pending = match validated {
            Ok((language, url, mode)) => PendingTranslation {
                outcome: Outcome::Fetching(spawn_fetch(fetcher, language, url, mode, timeout)),
            },
            Err(e) => PendingTranslation::ready(Err(e)),
        };
        self.push(pending);
    }

    /// Queue a request that is already known to fail
    pub fn push_failure(&mut self, error: I18nError) {
        self.push(PendingTranslation::ready(Err(error)));
    }

    pub fn push(&mut self, pending: PendingTranslation) {
        self.translations.push(pending);
    }

    pub fn has_language(&self) -> bool {
        self.language.is_some()
    }

    /// Pending requests, the language request included
    pub fn len(&self) -> usize {
        usize::from(self.language.is_some()) + self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.translations.is_empty()
    }

    /// Move every pending request out, leaving this queue empty
    pub fn take(&mut self) -> RequestQueue {
        std::mem::take(self)
    }

    pub fn into_parts(self) -> (Option<I18nResult<String>>, Vec<PendingTranslation>) {
        (self.language, self.translations)
    }
}

fn spawn_fetch(
    fetcher: Arc<dyn Fetcher>,
    language: String,
    url: String,
    mode: MergeMode,
    timeout: Duration,
) -> BoxFuture<'static, I18nResult<ResolvedTranslation>> {
    let task_url = url.clone();
    let fetch = async move {
        debug!(fetcher = fetcher.fetcher_name(), %language, url = %task_url, "fetch started");
        let value = match tokio::time::timeout(timeout, fetcher.fetch(&language, &task_url)).await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(I18nError::FetchFailed {
                    url: task_url,
                    reason: format!("timed out after {} ms", timeout.as_millis()),
                });
            }
        };
        let document = validate::translation(value, Some(&task_url))?;
        debug!(%language, url = %task_url, labels = document.len(), "fetch finished");
        Ok::<_, I18nError>(ResolvedTranslation {
            language,
            document,
            mode,
        })
    };

    match Handle::try_current() {
        Ok(handle) => {
            let task = handle.spawn(fetch);
            async move {
                task.await.unwrap_or_else(|e| {
                    Err(I18nError::FetchFailed {
                        url,
                        reason: format!("fetch task failed: {}", e),
                    })
                })
            }
            .boxed()
        }
        Err(_) => fetch.boxed(),
    }
}

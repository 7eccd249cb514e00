//! Configuration run: drains a queue snapshot into the session state
//!
//! The language request is applied first, then translation requests strictly in the
//! order they were registered. Each request is awaited on its own and applied in one
//! short write, so a later `Extend` always lands on a fully applied earlier request.
//! A failed request is recorded and skipped; it never stops the ones after it.

use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::{I18nError, I18nResult};
use crate::events::{ConfigEvent, Notifier};
use crate::queue::RequestQueue;
use crate::table::TranslationTable;

/// State owned by one session: the table and the language lookups use
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub table: TranslationTable,
    pub current_language: Option<String>,
}

/// Apply every request of `batch` to `state`
///
/// # Returns
///
/// * `Ok(())` - Nothing failed, including the case of an empty batch
/// * `Err(I18nError::ConfigurationFailed)` - Every failure, in registration order
pub async fn drain(
    batch: RequestQueue,
    state: &RwLock<SessionState>,
    notifier: &Notifier,
) -> I18nResult<()> {
    if batch.is_empty() {
        debug!("nothing to configure");
        return Ok(());
    }

    notifier.notify(ConfigEvent::Started {
        requests: batch.len(),
    });

    let (language, translations) = batch.into_parts();
    let mut failures = Vec::new();
    let mut applied = 0;

    let record = |reason: I18nError, failures: &mut Vec<I18nError>| {
        notifier.notify(ConfigEvent::RequestFailed {
            reason: reason.clone(),
        });
        failures.push(reason);
    };

    match language {
        Some(Ok(language)) => {
            state
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .current_language = Some(language.clone());
            applied += 1;
            notifier.notify(ConfigEvent::LanguageSet { language });
        }
        Some(Err(reason)) => record(reason, &mut failures),
        None => {}
    }

    for pending in translations {
        match pending.resolve().await {
            Ok(resolved) => {
                let event = state
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .table
                    .apply(resolved);
                applied += 1;
                notifier.notify(event);
            }
            Err(reason) => record(reason, &mut failures),
        }
    }

    notifier.notify(ConfigEvent::Finished {
        applied,
        failed: failures.len(),
    });

    if failures.is_empty() {
        Ok(())
    } else {
        Err(I18nError::ConfigurationFailed(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{Fetcher, MockFetcher, MockMode};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn recording_notifier() -> (Notifier, Arc<Mutex<Vec<ConfigEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let notifier = Notifier::new(Some(Arc::new(move |event: &ConfigEvent| {
            sink.lock().unwrap().push(event.clone());
        })));
        (notifier, events)
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let state = RwLock::new(SessionState::default());
        let (notifier, events) = recording_notifier();

        assert!(drain(RequestQueue::new(), &state, &notifier).await.is_ok());
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(*state.read().unwrap(), SessionState::default());
    }

    #[tokio::test]
    async fn test_replace_then_extend() {
        let state = RwLock::new(SessionState::default());
        let mut batch = RequestQueue::new();
        batch.set_language(&json!("en"));
        batch.push_document(&json!("en"), json!({"A": "a", "B": "b"}), None);
        batch.push_document(&json!("en"), json!({"B": "b2", "C": "c"}), Some(&json!(true)));

        drain(batch, &state, &Notifier::default()).await.unwrap();

        let state = state.read().unwrap();
        assert_eq!(state.current_language.as_deref(), Some("en"));
        assert_eq!(
            state.table.document("en").cloned().map(serde_json::Value::Object),
            Some(json!({"A": "a", "B": "b2", "C": "c"}))
        );
    }

    #[tokio::test]
    async fn test_replace_after_extend_discards() {
        let state = RwLock::new(SessionState::default());
        let mut batch = RequestQueue::new();
        batch.push_document(&json!("en"), json!({"A": "a"}), None);
        batch.push_document(&json!("en"), json!({"B": "b"}), Some(&json!(true)));
        batch.push_document(&json!("en"), json!({"C": "c"}), Some(&json!(false)));

        drain(batch, &state, &Notifier::default()).await.unwrap();

        let state = state.read().unwrap();
        assert_eq!(
            state.table.document("en").cloned().map(serde_json::Value::Object),
            Some(json!({"C": "c"}))
        );
        // a translation alone never selects a language
        assert_eq!(state.current_language, None);
    }

    #[tokio::test]
    async fn test_collects_all_failures() {
        let state = RwLock::new(SessionState::default());
        let (notifier, events) = recording_notifier();
        let mut batch = RequestQueue::new();
        batch.set_language(&json!(""));
        batch.push_document(&json!("en"), json!("nope"), None);
        batch.push_document(&json!("en"), json!({"A": "a"}), None);
        batch.push_failure(I18nError::InvalidUrl);

        let result = drain(batch, &state, &notifier).await;

        assert_eq!(
            result,
            Err(I18nError::ConfigurationFailed(vec![
                I18nError::InvalidLanguage,
                I18nError::InvalidTranslation { origin: None },
                I18nError::InvalidUrl,
            ]))
        );
        // the good request in the middle was still applied
        assert_eq!(
            state.read().unwrap().table.lookup("en", "A"),
            Some(&json!("a"))
        );

        let events = events.lock().unwrap();
        assert_eq!(events.first(), Some(&ConfigEvent::Started { requests: 4 }));
        assert_eq!(
            events.last(),
            Some(&ConfigEvent::Finished {
                applied: 1,
                failed: 3
            })
        );
    }

    #[tokio::test]
    async fn test_failed_language_keeps_current() {
        let state = RwLock::new(SessionState {
            current_language: Some("en".to_string()),
            ..SessionState::default()
        });
        let mut batch = RequestQueue::new();
        batch.set_language(&json!(null));

        assert!(drain(batch, &state, &Notifier::default()).await.is_err());
        assert_eq!(
            state.read().unwrap().current_language.as_deref(),
            Some("en")
        );
    }

    #[tokio::test]
    async fn test_out_of_order_fetches_apply_in_registration_order() {
        let fetcher: Arc<dyn Fetcher> = Arc::new(
            MockFetcher::documents([
                ("mock://first", json!({"A": "first", "B": "first"})),
                ("mock://second", json!({"A": "second"})),
            ])
            .delay_for("mock://first", 80),
        );
        let state = RwLock::new(SessionState::default());
        let (notifier, events) = recording_notifier();
        let timeout = Duration::from_secs(5);

        let mut batch = RequestQueue::new();
        batch.push_remote(
            &json!("en"),
            &json!("mock://first"),
            None,
            Arc::clone(&fetcher),
            timeout,
        );
        batch.push_remote(
            &json!("en"),
            &json!("mock://second"),
            Some(&json!(true)),
            Arc::clone(&fetcher),
            timeout,
        );

        drain(batch, &state, &notifier).await.unwrap();

        assert_eq!(
            state.read().unwrap().table.document("en").cloned().map(serde_json::Value::Object),
            Some(json!({"A": "second", "B": "first"}))
        );
        let events = events.lock().unwrap();
        assert_eq!(
            events[1],
            ConfigEvent::TranslationReplaced {
                language: "en".to_string(),
                labels: 2
            }
        );
        assert_eq!(
            events[2],
            ConfigEvent::TranslationExtended {
                language: "en".to_string(),
                labels: 1
            }
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_block_others() {
        let fetcher: Arc<dyn Fetcher> = Arc::new(MockFetcher::new(MockMode::Error(
            "connection refused".to_string(),
        )));
        let state = RwLock::new(SessionState::default());
        let mut batch = RequestQueue::new();
        batch.set_language(&json!("en"));
        batch.push_remote(
            &json!("en"),
            &json!("mock://down"),
            None,
            fetcher,
            Duration::from_secs(1),
        );
        batch.push_document(&json!("en"), json!({"A": "a"}), None);

        let result = drain(batch, &state, &Notifier::default()).await;

        match result {
            Err(I18nError::ConfigurationFailed(reasons)) => {
                assert_eq!(reasons.len(), 1);
                assert!(matches!(&reasons[0], I18nError::FetchFailed { url, .. } if url == "mock://down"));
            }
            other => panic!("Expected ConfigurationFailed, got {:?}", other),
        }
        assert_eq!(
            state.read().unwrap().table.lookup("en", "A"),
            Some(&json!("a"))
        );
    }
}

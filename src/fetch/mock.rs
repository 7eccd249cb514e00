//! Mock translation source for testing
//!
//! This module provides a deterministic, network-free [`Fetcher`] for exercising the
//! configuration pipeline without a server.
//!
//! # Example
//!
//! ```ignore
//! use label_i18n::fetch::{Fetcher, MockFetcher, MockMode};
//!
//! #[tokio::test]
//! async fn test_fetch() {
//!     let mock = MockFetcher::new(MockMode::Echo);
//!     let value = mock.fetch("fr", "mock://messages").await.unwrap();
//!     assert_eq!(value["language"], "fr");
//! }
//! ```

use crate::error::{I18nError, I18nResult};
use crate::fetch::Fetcher;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock fetch modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Serve predefined bodies keyed by URL; unknown URLs fail like a 404
    Documents(HashMap<String, Value>),

    /// Answer `{"language": <language>, "url": <url>}`
    Echo,

    /// Fail every fetch with this reason
    Error(String),

    /// Never complete
    Hang,
}

/// Mock fetcher that simulates various source behaviours
#[derive(Debug, Clone)]
pub struct MockFetcher {
    mode: MockMode,
    /// Simulated latency applied to every fetch (in milliseconds)
    delay_ms: u64,
    /// Per-URL latency overriding `delay_ms`
    url_delays: HashMap<String, u64>,
    calls: Arc<AtomicUsize>,
}

impl MockFetcher {
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, 0)
    }

    /// Create a MockFetcher with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            mode,
            delay_ms,
            url_delays: HashMap::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Serve `documents` keyed by URL
    pub fn documents<I, K>(documents: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::new(MockMode::Documents(
            documents.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Delay fetches of `url` by `delay_ms`, e.g. to make them finish out of order
    pub fn delay_for(mut self, url: &str, delay_ms: u64) -> Self {
        self.url_delays.insert(url.to_string(), delay_ms);
        self
    }

    /// Number of fetches started so far, shared between clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn apply_delay(&self, url: &str) {
        let delay_ms = self.url_delays.get(url).copied().unwrap_or(self.delay_ms);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, language: &str, url: &str) -> I18nResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.apply_delay(url).await;

        match &self.mode {
            MockMode::Documents(documents) => {
                documents
                    .get(url)
                    .cloned()
                    .ok_or_else(|| I18nError::FetchFailed {
                        url: url.to_string(),
                        reason: "server responded with 404 Not Found".to_string(),
                    })
            }
            MockMode::Echo => Ok(json!({ "language": language, "url": url })),
            MockMode::Error(reason) => Err(I18nError::FetchFailed {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            MockMode::Hang => std::future::pending().await,
        }
    }

    fn fetcher_name(&self) -> &str {
        "Mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_documents_mode() {
        let mock = MockFetcher::documents([("mock://en", json!({"A": "a"}))]);
        assert_eq!(mock.fetch("en", "mock://en").await.unwrap(), json!({"A": "a"}));
        assert!(matches!(
            mock.fetch("en", "mock://missing").await,
            Err(I18nError::FetchFailed { .. })
        ));
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_echo_mode() {
        let mock = MockFetcher::new(MockMode::Echo);
        let value = mock.fetch("fr", "mock://x").await.unwrap();
        assert_eq!(value, json!({"language": "fr", "url": "mock://x"}));
    }

    #[tokio::test]
    async fn test_error_mode() {
        let mock = MockFetcher::new(MockMode::Error("connection refused".to_string()));
        assert_eq!(
            mock.fetch("en", "mock://x").await,
            Err(I18nError::FetchFailed {
                url: "mock://x".to_string(),
                reason: "connection refused".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_hang_mode_never_completes() {
        let mock = MockFetcher::new(MockMode::Hang);
        let result =
            tokio::time::timeout(Duration::from_millis(20), mock.fetch("en", "mock://x")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_calls_shared_between_clones() {
        let mock = MockFetcher::new(MockMode::Echo);
        let clone = mock.clone();
        clone.fetch("en", "mock://x").await.unwrap();
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.fetcher_name(), "Mock");
    }
}

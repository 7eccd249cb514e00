//! HTTP translation source
//!
//! Issues one `GET` per registration with the language passed as the `language`
//! query parameter and decodes the JSON body.

use crate::config::Settings;
use crate::error::{I18nError, I18nResult};
use crate::fetch::Fetcher;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

/// reqwest-backed [`Fetcher`]
#[derive(Clone)]
pub struct HttpFetcher {
    /// HTTP client for async requests
    client: reqwest::Client,
    user_agent: String,
}

impl HttpFetcher {
    /// Query parameter carrying the requested language
    const LANGUAGE_PARAM: &'static str = "language";

    /// Create a fetcher whose client uses the timeout and user agent from `settings`
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New fetcher instance
    /// * `Err(I18nError::HttpClient)` - If HTTP client creation fails
    pub fn new(settings: &Settings) -> I18nResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.fetch_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| I18nError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            user_agent: settings.user_agent.clone(),
        })
    }

    /// Append the language parameter, keeping any query the URL already has
    fn request_url(url: &str, language: &str) -> Result<Url, String> {
        let mut parsed = Url::parse(url).map_err(|e| format!("invalid URL: {}", e))?;
        parsed
            .query_pairs_mut()
            .append_pair(Self::LANGUAGE_PARAM, language);
        Ok(parsed)
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn fetch_failed(url: &str, reason: impl Into<String>) -> I18nError {
    I18nError::FetchFailed {
        url: url.to_string(),
        reason: reason.into(),
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, language: &str, url: &str) -> I18nResult<Value> {
        let request_url =
            Self::request_url(url, language).map_err(|reason| fetch_failed(url, reason))?;

        debug!(%request_url, "fetching translation");
        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(|e| fetch_failed(url, e.to_string()))?;

        // Check HTTP status
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(url, format!("server responded with {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| fetch_failed(url, format!("failed to read body: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| {
            debug!(url, error = %e, "translation body is not JSON");
            I18nError::InvalidTranslation {
                origin: Some(url.to_string()),
            }
        })
    }

    fn fetcher_name(&self) -> &str {
        "HTTP"
    }
}

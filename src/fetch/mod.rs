//! Remote translation sources
//!
//! A [`Fetcher`] turns a `(language, url)` registration into a JSON value. The
//! session spawns one fetch per `translation_url` call, bounds it with the
//! configured timeout and checks that the result is a translation document, so a
//! fetcher only has to deal with transport.
//!
//! # Example
//!
//! ```ignore
//! use label_i18n::fetch::{Fetcher, HttpFetcher};
//! use label_i18n::Settings;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpFetcher::new(&Settings::default())?;
//!     let document = fetcher.fetch("fr", "https://example.com/messages").await?;
//!     println!("{}", document);
//!     Ok(())
//! }
//! ```

pub mod http;
pub mod mock;

pub use http::HttpFetcher;
pub use mock::{MockFetcher, MockMode};

use crate::error::I18nResult;
use async_trait::async_trait;
use serde_json::Value;

/// Generic trait for translation document sources
///
/// All methods are async to support I/O-bound operations like network requests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the translation document for `language` from `url`
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The decoded body; shape is checked by the caller
    /// * `Err(I18nError::FetchFailed)` - Transport failed or the source answered with an error
    /// * `Err(I18nError::InvalidTranslation)` - The body could not be decoded
    async fn fetch(&self, language: &str, url: &str) -> I18nResult<Value>;

    /// Name used in logs to identify the source implementation
    fn fetcher_name(&self) -> &str;
}

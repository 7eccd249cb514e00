//! Label translation with deferred, order-preserving configuration
//!
//! A [`Translator`] collects "set the language" and "register a translation"
//! requests from literal documents, JSON files, directories, manifests and remote
//! URLs. Nothing is applied until [`Translator::configure`] (or the first lookup)
//! drains the queue: the language first, then every translation in registration
//! order, replacing or extending the stored document for its language. Failed
//! requests are collected and reported together without stopping the others.
//!
//! Lookups resolve a label in the current language and substitute positional
//! parameters into `{0}`, `{1}`, ... placeholders.
//!
//! ```ignore
//! use label_i18n::{MergeMode, Translator};
//! use serde_json::json;
//!
//! let translator = Translator::new()?;
//! translator
//!     .language("en")
//!     .translation("en", json!({"GREETING": "Hello, {0}!"}), MergeMode::Replace);
//! assert_eq!(translator.translate_with("GREETING", &["World"]).await?, "Hello, World!");
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod interpolate;
pub mod loader;
pub mod pipeline;
pub mod queue;
pub mod session;
pub mod table;
pub mod validate;


// Re-export main types for convenient access
pub use config::{Manifest, Settings, SourceSpec};
pub use error::{I18nError, I18nResult};
pub use events::{ConfigEvent, Observer};
pub use fetch::{Fetcher, HttpFetcher, MockFetcher, MockMode};
pub use interpolate::interpolate;
pub use loader::{load_document, load_manifest};
pub use queue::{MergeMode, RequestQueue};
pub use session::{Translator, TranslatorBuilder};
pub use table::{TranslationDocument, TranslationTable};

//! Progress notifications emitted while a configuration run drains the queue

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::I18nError;

/// One step of a configuration run, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    /// A run began with this many pending requests
    Started { requests: usize },
    LanguageSet { language: String },
    TranslationReplaced { language: String, labels: usize },
    TranslationExtended { language: String, labels: usize },
    /// A request was drained without touching the table
    RequestFailed { reason: I18nError },
    Finished { applied: usize, failed: usize },
}

impl fmt::Display for ConfigEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigEvent::Started { requests } => {
                write!(f, "configuration started with {} pending request(s)", requests)
            }
            ConfigEvent::LanguageSet { language } => write!(f, "language set to {}", language),
            ConfigEvent::TranslationReplaced { language, labels } => {
                write!(f, "translation set for {} ({} labels)", language, labels)
            }
            ConfigEvent::TranslationExtended { language, labels } => {
                write!(f, "translation extended for {} ({} labels)", language, labels)
            }
            ConfigEvent::RequestFailed { reason } => write!(f, "request failed: {}", reason),
            ConfigEvent::Finished { applied, failed } => write!(
                f,
                "configuration finished: {} applied, {} failed",
                applied, failed
            ),
        }
    }
}

/// Callback receiving every [`ConfigEvent`]
pub type Observer = Arc<dyn Fn(&ConfigEvent) + Send + Sync>;

/// Fans each event out to the tracing log and the optional observer
#[derive(Clone, Default)]
pub struct Notifier {
    observer: Option<Observer>,
}

impl Notifier {
    pub fn new(observer: Option<Observer>) -> Self {
        Self { observer }
    }

    pub fn notify(&self, event: ConfigEvent) {
        match &event {
            ConfigEvent::RequestFailed { .. } => warn!("{}", event),
            _ => info!("{}", event),
        }
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

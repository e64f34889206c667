//! # Data Source
//!
//! Where purchases, history and terms come from.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DataSource (trait)                                 │
//! │                                                                         │
//! │   fetch_purchases()            ──► Vec<Purchase>                        │
//! │   fetch_deferred_purchases()   ──► Vec<DeferredPurchase>                │
//! │   fetch_terms()                ──► TermsText                            │
//! │                                                                         │
//! │   ┌──────────────────────┐        ┌──────────────────────┐              │
//! │   │   JsonFileSource     │        │    StaticSource      │              │
//! │   │  <dir>/purchases.json│        │  in-memory lists,    │              │
//! │   │  <dir>/deferred-...  │        │  None = unavailable  │              │
//! │   │  <dir>/terms.json    │        │                      │              │
//! │   └──────────────────────┘        └──────────────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `null` document is read as an empty list. Each fetch either returns
//! the complete list or fails; there are no partial results.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use deferral_core::{DeferredPurchase, Purchase, TermsText};

pub const PURCHASES_FILE: &str = "purchases.json";
pub const DEFERRED_PURCHASES_FILE: &str = "deferred-purchases.json";
pub const TERMS_FILE: &str = "terms.json";

// =============================================================================
// Errors
// =============================================================================

/// Fetch failures.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The document could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document does not have the expected shape.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The source cannot serve the request at all.
    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

// =============================================================================
// Trait
// =============================================================================

/// Supplier of the three session documents.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_purchases(&self) -> SourceResult<Vec<Purchase>>;

    async fn fetch_deferred_purchases(&self) -> SourceResult<Vec<DeferredPurchase>>;

    async fn fetch_terms(&self) -> SourceResult<TermsText>;
}

// =============================================================================
// JSON Files
// =============================================================================

/// Reads the documents from a directory of JSON files.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileSource { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read<T: DeserializeOwned>(&self, file: &str) -> SourceResult<T> {
        let path = self.dir.join(file);
        debug!(path = %path.display(), "Reading data file");

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.clone(),
                source,
            })?;

        serde_json::from_str(&text).map_err(|source| SourceError::Parse { path, source })
    }
}

#[async_trait]
impl DataSource for JsonFileSource {
    async fn fetch_purchases(&self) -> SourceResult<Vec<Purchase>> {
        let list: Option<Vec<Purchase>> = self.read(PURCHASES_FILE).await?;
        Ok(list.unwrap_or_default())
    }

    async fn fetch_deferred_purchases(&self) -> SourceResult<Vec<DeferredPurchase>> {
        let list: Option<Vec<DeferredPurchase>> = self.read(DEFERRED_PURCHASES_FILE).await?;
        Ok(list.unwrap_or_default())
    }

    async fn fetch_terms(&self) -> SourceResult<TermsText> {
        self.read(TERMS_FILE).await
    }
}

// =============================================================================
// In-Memory
// =============================================================================

/// Serves fixed documents. A `None` document fails with
/// [`SourceError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub purchases: Option<Vec<Purchase>>,
    pub deferred: Option<Vec<DeferredPurchase>>,
    pub terms: Option<TermsText>,
}

impl StaticSource {
    pub fn new(purchases: Vec<Purchase>, deferred: Vec<DeferredPurchase>, terms: TermsText) -> Self {
        StaticSource {
            purchases: Some(purchases),
            deferred: Some(deferred),
            terms: Some(terms),
        }
    }
}

fn serve<T: Clone>(doc: &Option<T>, name: &str) -> SourceResult<T> {
    doc.clone()
        .ok_or_else(|| SourceError::Unavailable(format!("{} not available", name)))
}

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch_purchases(&self) -> SourceResult<Vec<Purchase>> {
        serve(&self.purchases, "purchases")
    }

    async fn fetch_deferred_purchases(&self) -> SourceResult<Vec<DeferredPurchase>> {
        serve(&self.deferred, "deferred purchases")
    }

    async fn fetch_terms(&self) -> SourceResult<TermsText> {
        serve(&self.terms, "terms")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_json_source_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(PURCHASES_FILE),
            r#"[{"id": 1, "merchantName": "OXXO", "purchaseDate": "2024-01-01",
                 "purchaseAmount": 120.5, "offers": []}]"#,
        )
        .unwrap();
        fs::write(dir.path().join(DEFERRED_PURCHASES_FILE), "null").unwrap();
        fs::write(dir.path().join(TERMS_FILE), r#"{"description": "Terms"}"#).unwrap();

        let source = JsonFileSource::new(dir.path());
        let purchases = source.fetch_purchases().await.unwrap();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].merchant_name, "OXXO");

        assert!(source.fetch_deferred_purchases().await.unwrap().is_empty());
        assert_eq!(source.fetch_terms().await.unwrap().description, "Terms");
    }

    #[tokio::test]
    async fn test_json_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PURCHASES_FILE), "{not json").unwrap();

        let source = JsonFileSource::new(dir.path());
        assert!(matches!(
            source.fetch_purchases().await,
            Err(SourceError::Parse { .. })
        ));
        assert!(matches!(
            source.fetch_terms().await,
            Err(SourceError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_static_source_unavailable() {
        let source = StaticSource::default();
        assert!(matches!(
            source.fetch_purchases().await,
            Err(SourceError::Unavailable(_))
        ));
    }
}

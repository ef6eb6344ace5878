//! Read-only access to storefront data
//!
//! Views never talk to the backend directly. They hold a [`DataSource`] and
//! receive immutable snapshots (`Arc<[T]>`), which are replaced wholesale on
//! the next fetch. Two snapshots are "the same data" exactly when they share
//! an allocation, which is what memoized views key on.
//!
//! [`FixtureSource`] serves a JSON catalogue document and is what the CLI and
//! the tests use.

use crate::core::entity::{Category, DealRecord, Product, UserProfile};
use crate::core::error::{Error, ErrorTranslation, FetchErrorPattern, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

/// Message returned when no signed-in profile is available
pub const MISSING_SESSION: &str = "Authentication token is missing";

/// Injectable data-access interface
pub trait DataSource: Send + Sync {
    fn categories(&self) -> impl Future<Output = Result<Arc<[Category]>>> + Send;

    fn products(&self) -> impl Future<Output = Result<Arc<[Product]>>> + Send;

    /// Deal records of one client
    fn deals(&self, client_id: u64) -> impl Future<Output = Result<Arc<[DealRecord]>>> + Send;

    /// Profile of the signed-in customer
    fn profile(&self) -> impl Future<Output = Result<Arc<UserProfile>>> + Send;
}

/// On-disk shape of a catalogue fixture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub deals: Vec<DealRecord>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

/// [`DataSource`] backed by an in-memory catalogue document
#[derive(Debug, Clone)]
pub struct FixtureSource {
    categories: Arc<[Category]>,
    products: Arc<[Product]>,
    deals: Arc<[DealRecord]>,
    profile: Option<Arc<UserProfile>>,
    failure: Option<String>,
}

impl FixtureSource {
    pub fn new(doc: CatalogDocument) -> Self {
        Self {
            categories: doc.categories.into(),
            products: doc.products.into(),
            deals: doc.deals.into(),
            profile: doc.profile.map(Arc::new),
            failure: None,
        }
    }

    /// Parses a catalogue document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        Ok(Self::new(doc))
    }

    /// Reads a catalogue document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Serialization`] if it is malformed.
    ///
    /// # Async
    /// Uses `tokio::fs` for non-blocking file I/O.
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        let source = Self::from_json(&json)?;
        tracing::debug!(
            "Loaded catalogue from {}: {} categories, {} products, {} deals",
            path.display(),
            source.categories.len(),
            source.products.len(),
            source.deals.len()
        );
        Ok(source)
    }

    /// A source whose every fetch fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(CatalogDocument::default())
        }
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(msg) => Err(Error::Fetch(msg.clone())),
            None => Ok(()),
        }
    }
}

impl DataSource for FixtureSource {
    async fn categories(&self) -> Result<Arc<[Category]>> {
        self.check()?;
        Ok(Arc::clone(&self.categories))
    }

    async fn products(&self) -> Result<Arc<[Product]>> {
        self.check()?;
        Ok(Arc::clone(&self.products))
    }

    async fn deals(&self, client_id: u64) -> Result<Arc<[DealRecord]>> {
        self.check()?;
        Ok(self
            .deals
            .iter()
            .filter(|d| d.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn profile(&self) -> Result<Arc<UserProfile>> {
        self.check()?;
        self.profile
            .clone()
            .ok_or_else(|| Error::Fetch(MISSING_SESSION.to_string()))
    }
}

/// Lifecycle of one fetch: `Loading -> {Ready, Error}`
#[derive(Debug, Clone, Default)]
pub enum FetchState<T> {
    #[default]
    Loading,
    Ready(T),
    Error(String),
}

/// Which of the four view branches to render
#[derive(Debug, Clone)]
pub enum ViewBranch<'a, T> {
    Loading,
    Error(ErrorTranslation),
    Empty,
    Ready(&'a T),
}

impl<T> FetchState<T> {
    /// Settles a fetch result. Failures keep their message for display.
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => FetchState::Ready(value),
            Err(e) => {
                tracing::warn!("Fetch failed: {e}");
                FetchState::Error(match e {
                    Error::Fetch(msg) => msg,
                    other => other.to_string(),
                })
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Picks the view branch; `is_empty` decides whether ready data has
    /// anything to show.
    pub fn branch(&self, is_empty: impl FnOnce(&T) -> bool) -> ViewBranch<'_, T> {
        match self {
            FetchState::Loading => ViewBranch::Loading,
            FetchState::Error(msg) => ViewBranch::Error(FetchErrorPattern::match_error(msg)),
            FetchState::Ready(value) if is_empty(value) => ViewBranch::Empty,
            FetchState::Ready(value) => ViewBranch::Ready(value),
        }
    }
}

/// True when both snapshots share one allocation
pub fn same_snapshot<T>(a: &Arc<[T]>, b: &Arc<[T]>) -> bool {
    Arc::ptr_eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = r#"{
        "categories": [
            {"id": 1, "title": "All", "parent_id": 0},
            {"id": 2, "title": "Food", "parent_id": 0},
            {"id": 5, "title": "Fruit", "parent_id": 2}
        ],
        "products": [
            {"id": 10, "name": "Apple", "price": "1.5", "sub_category_id": 5}
        ],
        "deals": [
            {"id": 1, "offer_id": 1, "client_id": 7, "kind": "spend", "counter": 3,
             "goal": {"type": "tiered", "tiers": [{"threshold": 5, "reward": 10}]}},
            {"id": 2, "offer_id": 1, "client_id": 8, "kind": "spend", "counter": 9,
             "goal": {"type": "tiered", "tiers": [{"threshold": 5, "reward": 10}]}}
        ],
        "profile": {"client_id": 7, "full_name": "Sami Ben Ali"}
    }"#;

    #[tokio::test]
    async fn test_fixture_serves_snapshots() {
        let source = FixtureSource::from_json(DOC).unwrap();
        let categories = source.categories().await.unwrap();
        assert_eq!(categories.len(), 3);

        let again = source.categories().await.unwrap();
        assert!(Arc::ptr_eq(&categories, &again));

        let deals = source.deals(7).await.unwrap();
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].id, 1);

        let profile = source.profile().await.unwrap();
        assert_eq!(profile.client_id, 7);
    }

    #[tokio::test]
    async fn test_missing_profile_is_fetch_error() {
        let source = FixtureSource::new(CatalogDocument::default());
        let err = source.profile().await.unwrap_err();
        assert!(matches!(err, Error::Fetch(ref m) if m == MISSING_SESSION));
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = FixtureSource::failing("connection refused");
        let state = FetchState::from_result(source.products().await);
        assert_eq!(state.error(), Some("connection refused"));
        match state.branch(|p| p.is_empty()) {
            ViewBranch::Error(t) => assert!(t.user_message.contains("Connection")),
            other => panic!("unexpected branch: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();
        let source = FixtureSource::load(file.path()).await.unwrap();
        assert_eq!(source.products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = FixtureSource::load(file.path()).await.unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_view_branches() {
        let loading: FetchState<Arc<[u32]>> = FetchState::Loading;
        assert!(matches!(loading.branch(|v| v.is_empty()), ViewBranch::Loading));

        let empty: FetchState<Arc<[u32]>> = FetchState::Ready(Arc::from(Vec::new()));
        assert!(matches!(empty.branch(|v| v.is_empty()), ViewBranch::Empty));

        let ready: FetchState<Arc<[u32]>> = FetchState::Ready(Arc::from(vec![1, 2]));
        assert!(matches!(ready.branch(|v| v.is_empty()), ViewBranch::Ready(v) if v.len() == 2));
    }
}

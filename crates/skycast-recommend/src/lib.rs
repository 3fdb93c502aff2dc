//! Weather-based recommendations for SkyCast
//!
//! Static catalogs of activities, clothing, transportation modes and health
//! advisories, filtered and ranked against a weather snapshot. History and
//! preference persistence sit behind the `RecommendationStore` trait.

pub mod catalog;
pub mod engine;
pub mod service;
pub mod sqlite_store;
pub mod store;
pub mod tier;
pub mod types;

pub use catalog::{Catalog, CatalogIssue};
pub use engine::{RecommendationEngine, RecommendationSet};
pub use service::{RecommendationService, ServiceLimits};
pub use sqlite_store::SqliteRecommendationStore;
pub use store::{RecommendationRecord, RecommendationStore, ShownRecommendation, StoreError, StoreResult};
pub use tier::{gate, Gated, GatedRecommendations, SubscriptionTier};
pub use types::*;

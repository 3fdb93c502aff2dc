//! Recommendation history and preference storage trait.
//!
//! This module defines the `RecommendationStore` trait the service persists through,
//! plus the record types and error taxonomy shared by implementations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::RecommendationKind;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No matching record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (e.g., empty user or recommendation id).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage error (database, corrupt row, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// One showing of a recommendation to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub id: String,
    pub user_id: String,
    pub recommendation_id: String,
    pub recommendation_type: RecommendationKind,
    pub location_id: String,
    pub weather_condition: String,
    pub temperature: f64,
    pub timestamp: DateTime<Utc>,
    /// Whether the user found it helpful, once they said so
    pub feedback: Option<bool>,
}

/// Input for [`RecommendationStore::record_shown`].
#[derive(Debug, Clone, Copy)]
pub struct ShownRecommendation<'a> {
    pub user_id: &'a str,
    pub recommendation_id: &'a str,
    pub recommendation_type: RecommendationKind,
    pub location_id: &'a str,
    pub weather_condition: &'a str,
    pub temperature: f64,
}

/// Persistence collaborator for the recommendation feature.
///
/// Implementations don't need to be Sync; `RecommendationService` serializes access
/// through a mutex.
pub trait RecommendationStore: Send {
    /// Record that a recommendation was shown. Assigns a fresh id and the current time.
    ///
    /// # Errors
    /// Returns `StoreError::Validation` if the user or recommendation id is empty.
    fn record_shown(&self, shown: &ShownRecommendation<'_>) -> StoreResult<RecommendationRecord>;

    /// Attach feedback to the most recent showing of `recommendation_id` to `user_id`.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if that recommendation was never shown to the user.
    fn record_feedback(
        &self,
        user_id: &str,
        recommendation_id: &str,
        helpful: bool,
    ) -> StoreResult<RecommendationRecord>;

    /// Most recent records for `user_id`, newest first, at most `limit`.
    fn history(&self, user_id: &str, limit: usize) -> StoreResult<Vec<RecommendationRecord>>;

    /// All stored preferences for `user_id`.
    fn load_preferences(&self, user_id: &str) -> StoreResult<HashMap<String, String>>;

    /// Insert or replace one preference.
    ///
    /// # Errors
    /// Returns `StoreError::Validation` if the user id or key is empty.
    fn save_preference(&self, user_id: &str, key: &str, value: &str) -> StoreResult<()>;
}

/// Reject empty or whitespace-only identifiers.
///
/// # Errors
/// Returns `StoreError::Validation` naming `field`.
pub fn validate_id(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]
    use super::*;

    #[test]
    fn test_validate_id_empty() {
        assert!(matches!(validate_id("user_id", ""), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_validate_id_whitespace() {
        let result = validate_id("preference key", "  ");
        match result {
            Err(StoreError::Validation(msg)) => assert_eq!(msg, "preference key cannot be empty"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_id_valid() {
        assert!(validate_id("user_id", "user-1").is_ok());
    }

    #[test]
    fn test_record_serializes_kind_lowercase() {
        let record = RecommendationRecord {
            id: "r1".into(),
            user_id: "u1".into(),
            recommendation_id: "health.flood".into(),
            recommendation_type: RecommendationKind::Health,
            location_id: "home".into(),
            weather_condition: "Rain".into(),
            temperature: 8.5,
            timestamp: Utc::now(),
            feedback: None,
        };
        let value = serde_json::to_value(&record).unwrap_or_default();
        assert_eq!(value["recommendation_type"], "health");
        assert!(value["feedback"].is_null());
    }
}

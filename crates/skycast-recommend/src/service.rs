//! Caller-facing recommendation service.
//!
//! Combines the pure engine with the signed-in user and a persistence backend.
//! Filtering never touches the store; recording and preferences never touch the engine.

use std::collections::HashMap;

use parking_lot::Mutex;
use skycast_weather::WeatherSnapshot;

use crate::engine::{RecommendationEngine, RecommendationSet};
use crate::store::{RecommendationRecord, RecommendationStore, ShownRecommendation, StoreResult};
use crate::tier::{GatedRecommendations, SubscriptionTier, DEFAULT_FREE_LIMIT};
use crate::types::{
    ActivityRecommendation, ClothingRecommendation, HealthAdvisory, RecommendationItem,
    RecommendationKind, TransportationRecommendation,
};

/// Default number of history records returned.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Tunables for [`RecommendationService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimits {
    pub free_tier_limit: usize,
    pub history_limit: usize,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            free_tier_limit: DEFAULT_FREE_LIMIT,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

pub struct RecommendationService {
    engine: RecommendationEngine<'static>,
    store: Mutex<Box<dyn RecommendationStore>>,
    user_id: Option<String>,
    preferences: HashMap<String, String>,
    limits: ServiceLimits,
}

impl RecommendationService {
    pub fn new(store: Box<dyn RecommendationStore>) -> Self {
        Self::with_limits(store, ServiceLimits::default())
    }

    pub fn with_limits(store: Box<dyn RecommendationStore>, limits: ServiceLimits) -> Self {
        Self {
            engine: RecommendationEngine::builtin(),
            store: Mutex::new(store),
            user_id: None,
            preferences: HashMap::new(),
            limits,
        }
    }

    /// Switch the signed-in user. Cached preferences belong to the previous user and are dropped.
    pub fn set_user_id(&mut self, user_id: Option<String>) {
        if self.user_id != user_id {
            self.preferences.clear();
        }
        self.user_id = user_id.filter(|id| !id.trim().is_empty());
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn engine(&self) -> &RecommendationEngine<'static> {
        &self.engine
    }

    pub fn activity_recommendations(&self, snapshot: &WeatherSnapshot) -> Vec<ActivityRecommendation> {
        self.engine.activity_recommendations(snapshot)
    }

    pub fn clothing_recommendations(&self, snapshot: &WeatherSnapshot) -> Vec<ClothingRecommendation> {
        self.engine.clothing_recommendations(snapshot)
    }

    pub fn transportation_recommendations(
        &self,
        snapshot: &WeatherSnapshot,
    ) -> Vec<TransportationRecommendation> {
        self.engine.transportation_recommendations(snapshot)
    }

    pub fn health_advisories(&self, snapshot: &WeatherSnapshot) -> Vec<HealthAdvisory> {
        self.engine.health_advisories(snapshot)
    }

    pub fn recommend(&self, snapshot: &WeatherSnapshot) -> RecommendationSet {
        self.engine.recommend(snapshot)
    }

    /// All four lists, cut down for `tier`. Health advisories are always complete.
    pub fn recommend_gated(&self, snapshot: &WeatherSnapshot, tier: SubscriptionTier) -> GatedRecommendations {
        self.engine
            .recommend(snapshot)
            .gated(tier, self.limits.free_tier_limit)
    }

    /// Load the signed-in user's preferences into the local cache.
    ///
    /// Returns `Ok(false)` when signed out or when nothing is stored.
    ///
    /// # Errors
    /// Propagates store failures; the cache is left untouched in that case.
    pub fn load_user_preferences(&mut self) -> StoreResult<bool> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Ok(false);
        };

        let loaded = self.store.lock().load_preferences(user_id)?;
        if loaded.is_empty() {
            return Ok(false);
        }

        tracing::debug!("Loaded {} preferences for {}", loaded.len(), user_id);
        self.preferences = loaded;
        Ok(true)
    }

    /// Persist a preference and update the cache.
    ///
    /// Returns `Ok(false)` when signed out.
    ///
    /// # Errors
    /// Returns the store's error if the write fails; the cache is not updated.
    pub fn save_user_preference(&mut self, key: &str, value: &str) -> StoreResult<bool> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Ok(false);
        };

        self.store.lock().save_preference(user_id, key, value)?;
        self.preferences.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    /// Cached preference value, or `default` when unset or empty.
    pub fn user_preference(&self, key: &str, default: &str) -> String {
        self.preferences
            .get(key)
            .filter(|value| !value.is_empty())
            .map_or_else(|| default.to_string(), Clone::clone)
    }

    /// Record that a recommendation was shown to the signed-in user.
    ///
    /// Returns `Ok(false)` when signed out.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn record_recommendation_shown(
        &self,
        recommendation_id: &str,
        kind: RecommendationKind,
        location_id: &str,
        weather_condition: &str,
        temperature: f64,
    ) -> StoreResult<bool> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Ok(false);
        };

        self.store.lock().record_shown(&ShownRecommendation {
            user_id,
            recommendation_id,
            recommendation_type: kind,
            location_id,
            weather_condition,
            temperature,
        })?;
        Ok(true)
    }

    /// Record every item in a result list as shown for one snapshot.
    ///
    /// Returns how many records were written (zero when signed out).
    ///
    /// # Errors
    /// Stops at and returns the first store failure.
    pub fn record_items_shown(
        &self,
        items: &[RecommendationItem],
        location_id: &str,
        snapshot: &WeatherSnapshot,
    ) -> StoreResult<usize> {
        let mut written = 0;
        for item in items {
            if self.record_recommendation_shown(
                item.id(),
                item.kind(),
                location_id,
                &snapshot.condition,
                snapshot.temperature,
            )? {
                written += 1;
            }
        }
        Ok(written)
    }

    /// Store helpful / not-helpful feedback on the latest showing of a recommendation.
    ///
    /// Returns `Ok(false)` when signed out.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if the recommendation was never shown to this user.
    pub fn save_user_feedback(&self, recommendation_id: &str, helpful: bool) -> StoreResult<bool> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Ok(false);
        };

        self.store
            .lock()
            .record_feedback(user_id, recommendation_id, helpful)?;
        Ok(true)
    }

    /// The signed-in user's most recent records, newest first. Empty when signed out.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn recommendation_history(&self) -> StoreResult<Vec<RecommendationRecord>> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Ok(Vec::new());
        };

        self.store.lock().history(user_id, self.limits.history_limit)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::sqlite_store::SqliteRecommendationStore;
    use crate::store::StoreError;

    fn service() -> RecommendationService {
        let store = SqliteRecommendationStore::in_memory().expect("in-memory store");
        RecommendationService::new(Box::new(store))
    }

    fn signed_in() -> RecommendationService {
        let mut service = service();
        service.set_user_id(Some("user-1".to_string()));
        service
    }

    #[test]
    fn test_signed_out_persistence_is_noop() {
        let mut service = service();

        assert!(!service.load_user_preferences().unwrap());
        assert!(!service.save_user_preference("units", "celsius").unwrap());
        assert!(!service
            .record_recommendation_shown("activity.run", RecommendationKind::Activity, "home", "Clear", 20.0)
            .unwrap());
        assert!(!service.save_user_feedback("activity.run", true).unwrap());
        assert!(service.recommendation_history().unwrap().is_empty());
        assert_eq!(service.user_preference("units", "celsius"), "celsius");
    }

    #[test]
    fn test_blank_user_id_counts_as_signed_out() {
        let mut service = service();
        service.set_user_id(Some("   ".to_string()));
        assert_eq!(service.user_id(), None);
    }

    #[test]
    fn test_shown_then_feedback_then_history() {
        let service = signed_in();

        assert!(service
            .record_recommendation_shown("activity.run", RecommendationKind::Activity, "home", "Clear", 20.0)
            .unwrap());
        assert!(service.save_user_feedback("activity.run", true).unwrap());

        let history = service.recommendation_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].feedback, Some(true));
        assert_eq!(history[0].location_id, "home");
    }

    #[test]
    fn test_feedback_on_unseen_recommendation_errors() {
        let service = signed_in();
        let result = service.save_user_feedback("activity.beach", false);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_history_respects_limit() {
        let store = SqliteRecommendationStore::in_memory().unwrap();
        let mut service = RecommendationService::with_limits(
            Box::new(store),
            ServiceLimits {
                free_tier_limit: 2,
                history_limit: 2,
            },
        );
        service.set_user_id(Some("user-1".to_string()));

        for id in ["a", "b", "c"] {
            service
                .record_recommendation_shown(id, RecommendationKind::Clothing, "home", "Rain", 9.0)
                .unwrap();
        }

        let ids: Vec<_> = service
            .recommendation_history()
            .unwrap()
            .into_iter()
            .map(|r| r.recommendation_id)
            .collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn test_preferences_cache_and_reload() {
        let mut service = signed_in();

        assert!(!service.load_user_preferences().unwrap());
        assert!(service.save_user_preference("units", "fahrenheit").unwrap());
        assert_eq!(service.user_preference("units", "celsius"), "fahrenheit");

        service.set_user_id(Some("user-2".to_string()));
        assert_eq!(service.user_preference("units", "celsius"), "celsius");

        service.set_user_id(Some("user-1".to_string()));
        assert!(service.load_user_preferences().unwrap());
        assert_eq!(service.user_preference("units", "celsius"), "fahrenheit");
    }

    #[test]
    fn test_empty_preference_value_falls_back_to_default() {
        let mut service = signed_in();
        service.save_user_preference("theme", "").unwrap();
        assert_eq!(service.user_preference("theme", "light"), "light");
    }

    #[test]
    fn test_record_items_shown() {
        let service = signed_in();
        let snapshot = WeatherSnapshot::new(22.0, "Clear");
        let items = service.recommend(&snapshot).items();

        let written = service.record_items_shown(&items, "home", &snapshot).unwrap();
        assert_eq!(written, items.len());

        let history = service.recommendation_history().unwrap();
        assert_eq!(history.len(), items.len().min(DEFAULT_HISTORY_LIMIT));
        assert!(history.iter().all(|r| r.weather_condition == "Clear"));
    }

    #[test]
    fn test_recommend_gated_uses_free_limit() {
        let service = service();
        let snapshot = WeatherSnapshot::new(22.0, "Clear");

        let gated = service.recommend_gated(&snapshot, SubscriptionTier::Free);
        assert!(gated.activities.visible.len() <= DEFAULT_FREE_LIMIT);
        assert_eq!(gated.health, service.health_advisories(&snapshot));

        let full = service.recommend_gated(&snapshot, SubscriptionTier::Premium);
        assert_eq!(full.activities.visible, service.activity_recommendations(&snapshot));
        assert_eq!(full.clothing.visible, service.clothing_recommendations(&snapshot));
        assert_eq!(
            full.transportation.visible,
            service.transportation_recommendations(&snapshot)
        );
    }
}

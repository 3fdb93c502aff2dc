//! Weather-driven filtering and ranking over the recommendation catalogs.
//!
//! Every query is a pure function of the catalog and the snapshot: no I/O, no
//! mutation, and an empty list whenever nothing matches.

use std::cmp::{Ordering, Reverse};

use serde::Serialize;
use serde_json::Value;
use skycast_weather::WeatherSnapshot;

use crate::catalog::Catalog;
use crate::types::{
    ActivityRecommendation, CatalogEntry, ClothingRecommendation, HealthAdvisory,
    RecommendationItem, TransportationRecommendation,
};

/// Whether `entry` applies to `snapshot`.
///
/// The temperature must fall inside the inclusive range and at least one of the
/// entry's condition labels must occur, case-insensitively, inside the snapshot's
/// condition text. `"Rain"` therefore also matches `"Heavy Rain and Wind"`.
pub fn matches<T: CatalogEntry>(entry: &T, snapshot: &WeatherSnapshot) -> bool {
    let temperature = snapshot.temperature;
    if !(temperature >= entry.min_temp() && temperature <= entry.max_temp()) {
        return false;
    }

    let current = snapshot.condition.to_lowercase();
    entry
        .conditions()
        .iter()
        .any(|condition| current.contains(&condition.to_lowercase()))
}

/// Filter `entries` to those matching `snapshot`, then stable-sort with `compare`.
pub fn filter_and_rank<T, F>(entries: &[T], snapshot: &WeatherSnapshot, compare: F) -> Vec<T>
where
    T: CatalogEntry,
    F: FnMut(&T, &T) -> Ordering,
{
    let mut matched: Vec<T> = entries
        .iter()
        .filter(|entry| matches(*entry, snapshot))
        .copied()
        .collect();
    // slice::sort_by is stable, so ties keep catalog order
    matched.sort_by(compare);
    matched
}

/// All four recommendation lists for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendationSet {
    pub activities: Vec<ActivityRecommendation>,
    pub clothing: Vec<ClothingRecommendation>,
    pub transportation: Vec<TransportationRecommendation>,
    pub health: Vec<HealthAdvisory>,
}

impl RecommendationSet {
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
            && self.clothing.is_empty()
            && self.transportation.is_empty()
            && self.health.is_empty()
    }

    pub fn len(&self) -> usize {
        self.activities.len() + self.clothing.len() + self.transportation.len() + self.health.len()
    }

    /// Flatten into tagged items, catalogs in activity, clothing, transportation, health order.
    pub fn items(&self) -> Vec<RecommendationItem> {
        self.activities
            .iter()
            .copied()
            .map(RecommendationItem::from)
            .chain(self.clothing.iter().copied().map(RecommendationItem::from))
            .chain(self.transportation.iter().copied().map(RecommendationItem::from))
            .chain(self.health.iter().copied().map(RecommendationItem::from))
            .collect()
    }
}

/// Filters the catalogs against weather snapshots.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationEngine<'a> {
    catalog: Catalog<'a>,
}

impl RecommendationEngine<'static> {
    /// Engine over the built-in catalogs.
    pub const fn builtin() -> Self {
        Self {
            catalog: Catalog::builtin(),
        }
    }
}

impl Default for RecommendationEngine<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> RecommendationEngine<'a> {
    pub const fn new(catalog: Catalog<'a>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog<'a> {
        &self.catalog
    }

    /// Matching activities, most suitable first.
    pub fn activity_recommendations(&self, snapshot: &WeatherSnapshot) -> Vec<ActivityRecommendation> {
        filter_and_rank(self.catalog.activities, snapshot, |a, b| {
            b.suitability.cmp(&a.suitability)
        })
    }

    /// Matching clothing, essential items first.
    pub fn clothing_recommendations(&self, snapshot: &WeatherSnapshot) -> Vec<ClothingRecommendation> {
        filter_and_rank(self.catalog.clothing, snapshot, |a, b| {
            Reverse(a.essential).cmp(&Reverse(b.essential))
        })
    }

    /// Matching transportation modes, most suitable first.
    pub fn transportation_recommendations(
        &self,
        snapshot: &WeatherSnapshot,
    ) -> Vec<TransportationRecommendation> {
        filter_and_rank(self.catalog.transportation, snapshot, |a, b| {
            b.suitability.cmp(&a.suitability)
        })
    }

    /// Matching health advisories, most severe first.
    pub fn health_advisories(&self, snapshot: &WeatherSnapshot) -> Vec<HealthAdvisory> {
        filter_and_rank(self.catalog.health, snapshot, |a, b| b.severity.cmp(&a.severity))
    }

    pub fn recommend(&self, snapshot: &WeatherSnapshot) -> RecommendationSet {
        RecommendationSet {
            activities: self.activity_recommendations(snapshot),
            clothing: self.clothing_recommendations(snapshot),
            transportation: self.transportation_recommendations(snapshot),
            health: self.health_advisories(snapshot),
        }
    }

    /// Recommend from a raw weather payload.
    ///
    /// A payload without a usable current temperature and condition yields an
    /// empty set rather than an error.
    pub fn recommend_payload(&self, payload: &Value) -> RecommendationSet {
        match WeatherSnapshot::from_payload(payload) {
            Some(snapshot) => self.recommend(&snapshot),
            None => RecommendationSet::default(),
        }
    }
}

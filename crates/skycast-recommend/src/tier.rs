//! Subscription gating for recommendation lists.

use serde::{Deserialize, Serialize};

use crate::engine::RecommendationSet;
use crate::types::{
    ActivityRecommendation, ClothingRecommendation, HealthAdvisory, RecommendationItem,
    TransportationRecommendation,
};

/// Items per gated list shown to free-tier users.
pub const DEFAULT_FREE_LIMIT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Premium,
}

impl SubscriptionTier {
    pub fn is_premium(&self) -> bool {
        matches!(self, Self::Premium)
    }
}

impl std::str::FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "premium" => Ok(Self::Premium),
            other => Err(format!("unknown subscription tier: {}", other)),
        }
    }
}

/// A list cut down to what the tier may see.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gated<T> {
    pub visible: Vec<T>,
    /// How many matching items were withheld
    pub hidden: usize,
}

impl<T> Gated<T> {
    pub fn all(items: Vec<T>) -> Self {
        Self {
            visible: items,
            hidden: 0,
        }
    }

    /// True when an upgrade would reveal more items.
    pub fn has_hidden(&self) -> bool {
        self.hidden > 0
    }
}

/// Limit `items` for `tier`, keeping their order.
pub fn gate<T>(mut items: Vec<T>, tier: SubscriptionTier, free_limit: usize) -> Gated<T> {
    if tier.is_premium() || items.len() <= free_limit {
        return Gated::all(items);
    }

    let hidden = items.len() - free_limit;
    items.truncate(free_limit);
    Gated {
        visible: items,
        hidden,
    }
}

/// A [`RecommendationSet`] after gating.
///
/// Health advisories are safety information and are never gated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatedRecommendations {
    pub tier: SubscriptionTier,
    pub activities: Gated<ActivityRecommendation>,
    pub clothing: Gated<ClothingRecommendation>,
    pub transportation: Gated<TransportationRecommendation>,
    pub health: Vec<HealthAdvisory>,
}

impl GatedRecommendations {
    /// Visible items across all four lists, in display order.
    pub fn visible_items(&self) -> Vec<RecommendationItem> {
        self.activities
            .visible
            .iter()
            .copied()
            .map(RecommendationItem::from)
            .chain(self.clothing.visible.iter().copied().map(RecommendationItem::from))
            .chain(self.transportation.visible.iter().copied().map(RecommendationItem::from))
            .chain(self.health.iter().copied().map(RecommendationItem::from))
            .collect()
    }

    pub fn hidden_count(&self) -> usize {
        self.activities.hidden + self.clothing.hidden + self.transportation.hidden
    }
}

impl RecommendationSet {
    pub fn gated(self, tier: SubscriptionTier, free_limit: usize) -> GatedRecommendations {
        GatedRecommendations {
            tier,
            activities: gate(self.activities, tier, free_limit),
            clothing: gate(self.clothing, tier, free_limit),
            transportation: gate(self.transportation, tier, free_limit),
            health: self.health,
        }
    }
}

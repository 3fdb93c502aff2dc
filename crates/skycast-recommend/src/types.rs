//! Recommendation catalog entry types.
//!
//! Each of the four catalogs has its own entry struct with a kind-specific ranking
//! field. All of them share the [`CatalogEntry`] view the engine filters through.

use serde::Serialize;

/// The four recommendation catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Activity,
    Clothing,
    Transportation,
    Health,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Clothing => "clothing",
            Self::Transportation => "transportation",
            Self::Health => "health",
        }
    }

    /// Parse the persisted lowercase form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "activity" => Some(Self::Activity),
            "clothing" => Some(Self::Clothing),
            "transportation" => Some(Self::Transportation),
            "health" => Some(Self::Health),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Something to do given the weather.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivityRecommendation {
    pub id: &'static str,
    pub activity: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    /// 0-10, higher is more recommended
    pub suitability: u8,
    pub conditions: &'static [&'static str],
    pub min_temp: f64,
    pub max_temp: f64,
    pub is_outdoor: bool,
}

/// Something to wear given the weather.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClothingRecommendation {
    pub id: &'static str,
    pub item: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub conditions: &'static [&'static str],
    pub min_temp: f64,
    pub max_temp: f64,
    pub essential: bool,
}

/// A way of getting around given the weather.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransportationRecommendation {
    pub id: &'static str,
    pub mode: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    /// 0-10, higher is more recommended
    pub suitability: u8,
    pub conditions: &'static [&'static str],
    pub min_temp: f64,
    pub max_temp: f64,
}

/// A health warning triggered by the weather.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthAdvisory {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub conditions: &'static [&'static str],
    pub min_temp: f64,
    pub max_temp: f64,
    /// 0-10, higher is more urgent
    pub severity: u8,
}

/// Common view over catalog entries used by filtering and validation.
pub trait CatalogEntry: Copy {
    const KIND: RecommendationKind;

    fn id(&self) -> &'static str;
    fn label(&self) -> &'static str;
    fn conditions(&self) -> &'static [&'static str];
    fn min_temp(&self) -> f64;
    fn max_temp(&self) -> f64;

    /// The 0-10 ranking score, if this kind has one.
    fn score(&self) -> Option<u8> {
        None
    }
}

macro_rules! impl_catalog_entry {
    ($ty:ty, $kind:expr, $label:ident $(, $score:ident)?) => {
        impl CatalogEntry for $ty {
            const KIND: RecommendationKind = $kind;

            fn id(&self) -> &'static str {
                self.id
            }

            fn label(&self) -> &'static str {
                self.$label
            }

            fn conditions(&self) -> &'static [&'static str] {
                self.conditions
            }

            fn min_temp(&self) -> f64 {
                self.min_temp
            }

            fn max_temp(&self) -> f64 {
                self.max_temp
            }

            $(
                fn score(&self) -> Option<u8> {
                    Some(self.$score)
                }
            )?
        }
    };
}

impl_catalog_entry!(ActivityRecommendation, RecommendationKind::Activity, activity, suitability);
impl_catalog_entry!(ClothingRecommendation, RecommendationKind::Clothing, item);
impl_catalog_entry!(
    TransportationRecommendation,
    RecommendationKind::Transportation,
    mode,
    suitability
);
impl_catalog_entry!(HealthAdvisory, RecommendationKind::Health, title, severity);

/// Any recommendation, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecommendationItem {
    Activity(ActivityRecommendation),
    Clothing(ClothingRecommendation),
    Transportation(TransportationRecommendation),
    Health(HealthAdvisory),
}

impl RecommendationItem {
    pub fn kind(&self) -> RecommendationKind {
        match self {
            Self::Activity(_) => RecommendationKind::Activity,
            Self::Clothing(_) => RecommendationKind::Clothing,
            Self::Transportation(_) => RecommendationKind::Transportation,
            Self::Health(_) => RecommendationKind::Health,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Activity(a) => a.id,
            Self::Clothing(c) => c.id,
            Self::Transportation(t) => t.id,
            Self::Health(h) => h.id,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Activity(a) => a.activity,
            Self::Clothing(c) => c.item,
            Self::Transportation(t) => t.mode,
            Self::Health(h) => h.title,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Activity(a) => a.description,
            Self::Clothing(c) => c.description,
            Self::Transportation(t) => t.description,
            Self::Health(h) => h.description,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Activity(a) => a.icon,
            Self::Clothing(c) => c.icon,
            Self::Transportation(t) => t.icon,
            Self::Health(h) => h.icon,
        }
    }
}

impl From<ActivityRecommendation> for RecommendationItem {
    fn from(value: ActivityRecommendation) -> Self {
        Self::Activity(value)
    }
}

impl From<ClothingRecommendation> for RecommendationItem {
    fn from(value: ClothingRecommendation) -> Self {
        Self::Clothing(value)
    }
}

impl From<TransportationRecommendation> for RecommendationItem {
    fn from(value: TransportationRecommendation) -> Self {
        Self::Transportation(value)
    }
}

impl From<HealthAdvisory> for RecommendationItem {
    fn from(value: HealthAdvisory) -> Self {
        Self::Health(value)
    }
}

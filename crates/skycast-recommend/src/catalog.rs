//! Built-in recommendation catalogs.
//!
//! Read-only reference data: populated at compile time, never mutated. Temperature
//! bounds are inclusive and in Celsius.

use std::collections::HashSet;

use crate::types::{
    ActivityRecommendation, CatalogEntry, ClothingRecommendation, HealthAdvisory,
    TransportationRecommendation,
};

/// Highest allowed suitability or severity score.
pub const MAX_SCORE: u8 = 10;

pub static ACTIVITIES: &[ActivityRecommendation] = &[
    ActivityRecommendation {
        id: "activity.run",
        activity: "Go for a run",
        description: "Perfect weather for outdoor running. Consider a light jog or sprint intervals to take advantage of these conditions.",
        icon: "fitness",
        suitability: 9,
        conditions: &["Clear", "Partly cloudy"],
        min_temp: 15.0,
        max_temp: 25.0,
        is_outdoor: true,
    },
    ActivityRecommendation {
        id: "activity.cycling",
        activity: "Cycling",
        description: "Great conditions for cycling. The weather is ideal for a bike ride, either for commuting or recreation.",
        icon: "bicycle",
        suitability: 8,
        conditions: &["Clear", "Partly cloudy", "Cloudy"],
        min_temp: 12.0,
        max_temp: 28.0,
        is_outdoor: true,
    },
    ActivityRecommendation {
        id: "activity.park",
        activity: "Visit a park",
        description: "Enjoy nature and fresh air by visiting a local park. Perfect for walking, picnics, or simply relaxing.",
        icon: "leaf",
        suitability: 9,
        conditions: &["Clear", "Partly cloudy"],
        min_temp: 18.0,
        max_temp: 30.0,
        is_outdoor: true,
    },
    ActivityRecommendation {
        id: "activity.indoor-swimming",
        activity: "Indoor swimming",
        description: "While it's not ideal outside, indoor swimming is a great way to exercise regardless of weather.",
        icon: "water",
        suitability: 7,
        conditions: &["Rain", "Thunderstorm", "Drizzle"],
        min_temp: -5.0,
        max_temp: 40.0,
        is_outdoor: false,
    },
    ActivityRecommendation {
        id: "activity.museum",
        activity: "Visit a museum",
        description: "Take shelter from the elements and explore cultural exhibits at a local museum.",
        icon: "business",
        suitability: 8,
        conditions: &["Rain", "Thunderstorm", "Snow", "Sleet", "Hail"],
        min_temp: -10.0,
        max_temp: 40.0,
        is_outdoor: false,
    },
    ActivityRecommendation {
        id: "activity.winter-sports",
        activity: "Skiing or snowboarding",
        description: "Hit the slopes! Current snow conditions are favorable for winter sports.",
        icon: "snow",
        suitability: 9,
        conditions: &["Snow", "Light snow"],
        min_temp: -15.0,
        max_temp: 5.0,
        is_outdoor: true,
    },
    ActivityRecommendation {
        id: "activity.beach",
        activity: "Beach day",
        description: "Perfect weather for swimming, sunbathing, or beach sports. Don't forget sunscreen!",
        icon: "sunny",
        suitability: 10,
        conditions: &["Clear", "Partly cloudy"],
        min_temp: 25.0,
        max_temp: 40.0,
        is_outdoor: true,
    },
    ActivityRecommendation {
        id: "activity.gardening",
        activity: "Gardening",
        description: "Good conditions for gardening. Perfect time to tend to your plants or start a new garden project.",
        icon: "flower",
        suitability: 7,
        conditions: &["Clear", "Partly cloudy", "Cloudy"],
        min_temp: 12.0,
        max_temp: 30.0,
        is_outdoor: true,
    },
    ActivityRecommendation {
        id: "activity.reading",
        activity: "Indoor reading",
        description: "Curl up with a good book while listening to the weather outside. Perfect for relaxation.",
        icon: "book",
        suitability: 9,
        conditions: &["Rain", "Thunderstorm", "Snow"],
        min_temp: -10.0,
        max_temp: 40.0,
        is_outdoor: false,
    },
    ActivityRecommendation {
        id: "activity.movies",
        activity: "Movie marathon",
        description: "Stay in and enjoy a movie marathon. The weather outside makes this a cozy indoor activity.",
        icon: "film",
        suitability: 8,
        conditions: &["Rain", "Thunderstorm", "Snow", "Fog"],
        min_temp: -10.0,
        max_temp: 40.0,
        is_outdoor: false,
    },
];

pub static CLOTHING: &[ClothingRecommendation] = &[
    ClothingRecommendation {
        id: "clothing.t-shirt",
        item: "Light T-shirt",
        description: "A breathable, light t-shirt is perfect for today's temperature.",
        icon: "shirt",
        conditions: &["Clear", "Partly cloudy", "Cloudy"],
        min_temp: 20.0,
        max_temp: 40.0,
        essential: true,
    },
    ClothingRecommendation {
        id: "clothing.light-jacket",
        item: "Sweater or light jacket",
        description: "A medium-weight sweater or light jacket will keep you comfortable in these conditions.",
        icon: "archive",
        conditions: &["Clear", "Partly cloudy", "Cloudy"],
        min_temp: 10.0,
        max_temp: 20.0,
        essential: true,
    },
    ClothingRecommendation {
        id: "clothing.winter-coat",
        item: "Winter coat",
        description: "A heavy winter coat is essential in these cold conditions.",
        icon: "snow",
        conditions: &["Clear", "Partly cloudy", "Cloudy", "Snow", "Sleet"],
        min_temp: -20.0,
        max_temp: 5.0,
        essential: true,
    },
    ClothingRecommendation {
        id: "clothing.rain-jacket",
        item: "Rain jacket",
        description: "Stay dry with a waterproof rain jacket or umbrella.",
        icon: "umbrella",
        conditions: &["Rain", "Drizzle", "Thunderstorm"],
        min_temp: -5.0,
        max_temp: 30.0,
        essential: true,
    },
    ClothingRecommendation {
        id: "clothing.sunglasses",
        item: "Sunglasses",
        description: "Protect your eyes from UV rays with sunglasses.",
        icon: "sunny",
        conditions: &["Clear", "Partly cloudy"],
        min_temp: 10.0,
        max_temp: 40.0,
        essential: false,
    },
    ClothingRecommendation {
        id: "clothing.hat-gloves",
        item: "Hat and gloves",
        description: "Keep extremities warm with a hat and gloves in these cold temperatures.",
        icon: "hand-left",
        conditions: &["Clear", "Partly cloudy", "Cloudy", "Snow"],
        min_temp: -20.0,
        max_temp: 5.0,
        essential: true,
    },
    ClothingRecommendation {
        id: "clothing.scarf",
        item: "Scarf",
        description: "A scarf will provide extra warmth and protect your neck from cold winds.",
        icon: "stats-chart",
        conditions: &["Clear", "Partly cloudy", "Cloudy", "Snow", "Windy"],
        min_temp: -20.0,
        max_temp: 10.0,
        essential: false,
    },
    ClothingRecommendation {
        id: "clothing.sunscreen",
        item: "Sunscreen",
        description: "Apply sunscreen to protect your skin from UV rays, even on cloudy days.",
        icon: "sunny",
        conditions: &["Clear", "Partly cloudy", "Cloudy"],
        min_temp: 15.0,
        max_temp: 40.0,
        essential: true,
    },
    ClothingRecommendation {
        id: "clothing.waterproof-boots",
        item: "Waterproof boots",
        description: "Keep your feet dry with waterproof boots in wet conditions.",
        icon: "footsteps",
        conditions: &["Rain", "Snow", "Sleet"],
        min_temp: -10.0,
        max_temp: 20.0,
        essential: false,
    },
    ClothingRecommendation {
        id: "clothing.light-pants",
        item: "Light, breathable pants",
        description: "Stay comfortable in the heat with light, breathable pants or shorts.",
        icon: "layers",
        conditions: &["Clear", "Partly cloudy", "Cloudy"],
        min_temp: 20.0,
        max_temp: 40.0,
        essential: true,
    },
];

pub static TRANSPORTATION: &[TransportationRecommendation] = &[
    TransportationRecommendation {
        id: "transport.walking",
        mode: "Walking",
        description: "Conditions are ideal for walking. Enjoy the fresh air and get some exercise.",
        icon: "walk",
        suitability: 9,
        conditions: &["Clear", "Partly cloudy", "Cloudy"],
        min_temp: 5.0,
        max_temp: 30.0,
    },
    TransportationRecommendation {
        id: "transport.biking",
        mode: "Biking",
        description: "Good weather for cycling. Fast, eco-friendly, and good exercise.",
        icon: "bicycle",
        suitability: 8,
        conditions: &["Clear", "Partly cloudy", "Cloudy"],
        min_temp: 5.0,
        max_temp: 30.0,
    },
    TransportationRecommendation {
        id: "transport.public",
        mode: "Public transport",
        description: "Consider public transportation to avoid driving in these conditions.",
        icon: "bus",
        suitability: 9,
        conditions: &["Rain", "Snow", "Fog", "Thunderstorm"],
        min_temp: -20.0,
        max_temp: 40.0,
    },
    TransportationRecommendation {
        id: "transport.car",
        mode: "Car",
        description: "Driving is recommended in current weather conditions for comfort and safety.",
        icon: "car",
        suitability: 7,
        conditions: &["Rain", "Snow", "Fog", "Thunderstorm"],
        min_temp: -20.0,
        max_temp: 40.0,
    },
    TransportationRecommendation {
        id: "transport.ride-sharing",
        mode: "Ride sharing",
        description: "Consider ride sharing to reduce traffic and environmental impact.",
        icon: "people",
        suitability: 8,
        conditions: &["Rain", "Snow", "Fog"],
        min_temp: -20.0,
        max_temp: 40.0,
    },
    TransportationRecommendation {
        id: "transport.scooter",
        mode: "Scooter",
        description: "Electric scooters are convenient for short trips in good weather.",
        icon: "git-compare",
        suitability: 7,
        conditions: &["Clear", "Partly cloudy", "Cloudy"],
        min_temp: 10.0,
        max_temp: 35.0,
    },
];

pub static HEALTH_ADVISORIES: &[HealthAdvisory] = &[
    HealthAdvisory {
        id: "health.high-uv",
        title: "High UV Warning",
        description: "UV index is high. Wear sunscreen, sunglasses, and protective clothing. Limit direct sun exposure between 10am-4pm.",
        icon: "sunny",
        conditions: &["Clear", "Partly cloudy"],
        min_temp: 20.0,
        max_temp: 40.0,
        severity: 8,
    },
    HealthAdvisory {
        id: "health.cold",
        title: "Cold Weather Alert",
        description: "Extremely cold temperatures can cause frostbite and hypothermia. Limit time outdoors and wear appropriate clothing.",
        icon: "snow",
        conditions: &["Clear", "Partly cloudy", "Cloudy", "Snow"],
        min_temp: -30.0,
        max_temp: -5.0,
        severity: 9,
    },
    HealthAdvisory {
        id: "health.heat",
        title: "Heat Advisory",
        description: "Extreme heat can cause heat exhaustion and heat stroke. Stay hydrated, avoid strenuous activities, and stay in air-conditioned areas when possible.",
        icon: "thermometer",
        conditions: &["Clear", "Partly cloudy", "Cloudy"],
        min_temp: 32.0,
        max_temp: 45.0,
        severity: 9,
    },
    HealthAdvisory {
        id: "health.air-quality",
        title: "Air Quality Warning",
        description: "Poor air quality may affect sensitive groups. Those with respiratory conditions should limit outdoor activities.",
        icon: "cloud",
        conditions: &["Smoke", "Fog", "Haze"],
        min_temp: -5.0,
        max_temp: 40.0,
        severity: 7,
    },
    HealthAdvisory {
        id: "health.thunderstorm",
        title: "Thunderstorm Safety",
        description: "Seek shelter indoors during thunderstorms. Avoid open areas, water, and tall objects.",
        icon: "thunderstorm",
        conditions: &["Thunderstorm"],
        min_temp: 0.0,
        max_temp: 40.0,
        severity: 8,
    },
    HealthAdvisory {
        id: "health.flood",
        title: "Flood Warning",
        description: "Flooding is possible in your area. Avoid flooded areas and follow local emergency instructions.",
        icon: "water",
        conditions: &["Heavy rain", "Rain", "Thunderstorm"],
        min_temp: 0.0,
        max_temp: 40.0,
        severity: 9,
    },
    HealthAdvisory {
        id: "health.allergy",
        title: "Allergy Alert",
        description: "High pollen count today. Those with allergies should take preventative medications and limit outdoor exposure.",
        icon: "flower",
        conditions: &["Clear", "Partly cloudy", "Cloudy"],
        min_temp: 10.0,
        max_temp: 30.0,
        severity: 6,
    },
];

/// A catalog integrity violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogIssue {
    pub id: String,
    pub message: String,
}

impl std::fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.id, self.message)
    }
}

/// The four catalogs an engine filters over.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    pub activities: &'a [ActivityRecommendation],
    pub clothing: &'a [ClothingRecommendation],
    pub transportation: &'a [TransportationRecommendation],
    pub health: &'a [HealthAdvisory],
}

impl Catalog<'static> {
    /// The catalogs shipped with the application.
    pub const fn builtin() -> Self {
        Self {
            activities: ACTIVITIES,
            clothing: CLOTHING,
            transportation: TRANSPORTATION,
            health: HEALTH_ADVISORIES,
        }
    }
}

impl Default for Catalog<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> Catalog<'a> {
    pub const fn empty() -> Self {
        Self {
            activities: &[],
            clothing: &[],
            transportation: &[],
            health: &[],
        }
    }

    /// Total number of entries across all four catalogs.
    pub fn len(&self) -> usize {
        self.activities.len() + self.clothing.len() + self.transportation.len() + self.health.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check every entry for range order, score bounds, missing conditions and duplicate ids.
    ///
    /// Returns all violations found; an empty list means the catalog is consistent.
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        check_entries(self.activities, &mut seen, &mut issues);
        check_entries(self.clothing, &mut seen, &mut issues);
        check_entries(self.transportation, &mut seen, &mut issues);
        check_entries(self.health, &mut seen, &mut issues);

        issues
    }
}

fn check_entries<T: CatalogEntry>(
    entries: &[T],
    seen: &mut HashSet<&'static str>,
    issues: &mut Vec<CatalogIssue>,
) {
    let mut push = |id: &str, message: String| {
        issues.push(CatalogIssue {
            id: id.to_string(),
            message,
        });
    };

    for entry in entries {
        let id = entry.id();

        if id.trim().is_empty() {
            push(id, format!("{} entry '{}' has an empty id", T::KIND, entry.label()));
        } else if !seen.insert(id) {
            push(id, "duplicate id".to_string());
        }

        // NaN bounds fail this comparison too
        if !(entry.min_temp() <= entry.max_temp()) {
            push(
                id,
                format!(
                    "min_temp {} exceeds max_temp {}",
                    entry.min_temp(),
                    entry.max_temp()
                ),
            );
        }

        if entry.conditions().is_empty() {
            push(id, "no weather conditions listed".to_string());
        }

        // a blank label is a substring of every condition
        if entry.conditions().iter().any(|label| label.trim().is_empty()) {
            push(id, "blank weather condition label".to_string());
        }

        if let Some(score) = entry.score() {
            if score > MAX_SCORE {
                push(id, format!("score {} is above {}", score, MAX_SCORE));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_consistent() {
        let issues = Catalog::builtin().validate();
        assert!(issues.is_empty(), "catalog issues: {:?}", issues);
    }

    #[test]
    fn test_builtin_ranges_are_ordered() {
        let catalog = Catalog::builtin();
        assert!(catalog.activities.iter().all(|a| a.min_temp <= a.max_temp));
        assert!(catalog.clothing.iter().all(|c| c.min_temp <= c.max_temp));
        assert!(catalog.transportation.iter().all(|t| t.min_temp <= t.max_temp));
        assert!(catalog.health.iter().all(|h| h.min_temp <= h.max_temp));
    }

    #[test]
    fn test_builtin_catalog_sizes() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.activities.len(), 10);
        assert_eq!(catalog.clothing.len(), 10);
        assert_eq!(catalog.transportation.len(), 6);
        assert_eq!(catalog.health.len(), 7);
        assert_eq!(catalog.len(), 33);
        assert!(Catalog::empty().is_empty());
    }

    #[test]
    fn test_validate_reports_inverted_range_and_bad_score() {
        static BROKEN: &[HealthAdvisory] = &[HealthAdvisory {
            id: "health.broken",
            title: "Broken",
            description: "",
            icon: "",
            conditions: &["Rain"],
            min_temp: 30.0,
            max_temp: 10.0,
            severity: 11,
        }];

        let catalog = Catalog {
            health: BROKEN,
            ..Catalog::empty()
        };
        let issues = catalog.validate();

        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.id == "health.broken"));
        assert!(issues.iter().any(|i| i.message.contains("exceeds max_temp")));
        assert!(issues.iter().any(|i| i.message.contains("score 11")));
    }

    #[test]
    fn test_validate_reports_duplicates_across_catalogs() {
        static ACTS: &[ActivityRecommendation] = &[ActivityRecommendation {
            id: "shared",
            activity: "A",
            description: "",
            icon: "",
            suitability: 5,
            conditions: &[],
            min_temp: 0.0,
            max_temp: 1.0,
            is_outdoor: true,
        }];
        static TRANSPORT: &[TransportationRecommendation] = &[TransportationRecommendation {
            id: "shared",
            mode: "T",
            description: "",
            icon: "",
            suitability: 5,
            conditions: &["Clear"],
            min_temp: 0.0,
            max_temp: 1.0,
        }];

        let catalog = Catalog {
            activities: ACTS,
            transportation: TRANSPORT,
            ..Catalog::empty()
        };
        let issues = catalog.validate();

        assert!(issues.iter().any(|i| i.message == "duplicate id"));
        assert!(issues.iter().any(|i| i.message == "no weather conditions listed"));
    }

    #[test]
    fn test_validate_reports_blank_condition_label() {
        static CLOTHES: &[ClothingRecommendation] = &[ClothingRecommendation {
            id: "clothing.blank",
            item: "Anything",
            description: "",
            icon: "",
            conditions: &["Rain", "  "],
            min_temp: 0.0,
            max_temp: 10.0,
            essential: false,
        }];

        let catalog = Catalog {
            clothing: CLOTHES,
            ..Catalog::empty()
        };
        let issues = catalog.validate();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, "clothing.blank");
        assert_eq!(issues[0].message, "blank weather condition label");
    }
}

use anyhow::{Context, Result};
use std::sync::Arc;

use skycast_recommend::{
    GatedRecommendations, RecommendationService, RecommendationStore, ServiceLimits,
    SqliteRecommendationStore, SubscriptionTier,
};
use skycast_weather::{Location, WeatherProvider, WeatherSnapshot};

use crate::error::{AppError, ConfigError, DatabaseError};
use crate::Config;

/// Application state: configuration, weather provider and recommendation service.
pub struct App {
    config: Arc<Config>,
    provider: WeatherProvider,
    service: RecommendationService,
}

impl App {
    /// Create an application from the on-disk configuration.
    pub fn new() -> Result<Self> {
        let (config, _) = Config::load_validated()?;
        Self::from_config(config)
    }

    /// Create an application from an already-loaded configuration.
    ///
    /// Falls back to an in-memory store when the database file cannot be opened, so
    /// recommendations keep working without history.
    pub fn from_config(config: Config) -> Result<Self> {
        let provider =
            WeatherProvider::with_base_url(config.weather.api_url.clone(), config.weather.temperature_unit)
                .context("Failed to create weather client")?;

        let store = open_store(&config)?;
        let mut service = RecommendationService::with_limits(
            store,
            ServiceLimits {
                free_tier_limit: config.recommendations.free_tier_limit,
                history_limit: config.recommendations.history_limit,
            },
        );
        service.set_user_id(config.user_id.clone());

        if let Err(e) = service.load_user_preferences() {
            tracing::warn!("Could not load user preferences: {}", e);
        }

        Ok(Self {
            config: Arc::new(config),
            provider,
            service,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &RecommendationService {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut RecommendationService {
        &mut self.service
    }

    /// Location to use: the given one, else the configured default.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingSetting` when neither is available.
    pub fn resolve_location(&self, explicit: Option<Location>) -> Result<(String, Location), AppError> {
        if let Some(location) = explicit {
            return Ok(("adhoc".to_string(), location));
        }

        self.config
            .weather
            .default_location
            .as_ref()
            .map(|l| (l.id.clone(), l.to_location()))
            .ok_or_else(|| {
                ConfigError::MissingSetting("weather.default_location".to_string()).into()
            })
    }

    /// Fetch current conditions and reduce them to a Celsius snapshot.
    ///
    /// # Errors
    /// Returns the mapped provider error.
    pub async fn current_snapshot(&self, location: &Location) -> Result<WeatherSnapshot, AppError> {
        let current = self.provider.fetch_current(location).await?;
        tracing::info!(
            "Current weather: {:.1} ({:?}), {}",
            current.temperature,
            current.unit,
            current.condition.description()
        );
        Ok(current.snapshot())
    }

    /// Gated recommendations for `snapshot` at the configured tier, or `tier` if given.
    pub fn recommend(&self, snapshot: &WeatherSnapshot, tier: Option<SubscriptionTier>) -> GatedRecommendations {
        let tier = tier.unwrap_or(self.config.recommendations.tier);
        self.service.recommend_gated(snapshot, tier)
    }

    /// Record every visible item as shown for the signed-in user.
    ///
    /// # Errors
    /// Returns the mapped store error.
    pub fn record_shown(
        &self,
        gated: &GatedRecommendations,
        location_id: &str,
        snapshot: &WeatherSnapshot,
    ) -> Result<usize, AppError> {
        let items = gated.visible_items();
        Ok(self.service.record_items_shown(&items, location_id, snapshot)?)
    }

    pub fn shutdown(&mut self) {
        tracing::info!("Shutting down");
    }
}

fn open_store(config: &Config) -> Result<Box<dyn RecommendationStore>> {
    let path = config.database_path();

    let opened = std::fs::create_dir_all(&config.config_dir)
        .map_err(anyhow::Error::from)
        .and_then(|_| SqliteRecommendationStore::new(&path));

    match opened {
        Ok(store) => {
            tracing::debug!("Opened recommendation store at {}", path.display());
            Ok(Box::new(store))
        }
        Err(e) => {
            let err = DatabaseError::ConnectionFailed(format!("{}: {}", path.display(), e));
            tracing::warn!("{} - using in-memory store", err);
            Ok(Box::new(SqliteRecommendationStore::in_memory()?))
        }
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::process;

use skycast_core::{App, AppError, Config};
use skycast_recommend::{GatedRecommendations, RecommendationItem, SubscriptionTier};
use skycast_weather::{Location, TemperatureUnit, WeatherSnapshot};

/// Weather-aware recommendations
///
/// Suggests activities, clothing and ways of getting around for the current
/// weather, plus any health advisories it triggers.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch current weather and recommend for it
    Now {
        /// Latitude (defaults to the configured location)
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude (defaults to the configured location)
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Subscription tier to gate results with (defaults to the configured tier)
        #[arg(long)]
        tier: Option<SubscriptionTier>,

        /// Don't record the shown recommendations in history
        #[arg(long)]
        no_record: bool,
    },

    /// Recommend for a temperature and condition you supply
    Manual {
        /// Temperature reading
        #[arg(allow_negative_numbers = true)]
        temperature: f64,

        /// Condition text, e.g. "Light Rain"
        #[arg(required = true, num_args = 1..)]
        condition: Vec<String>,

        /// Unit of the temperature reading (defaults to the configured unit)
        #[arg(long, value_enum)]
        unit: Option<UnitArg>,

        /// Subscription tier to gate results with (defaults to the configured tier)
        #[arg(long)]
        tier: Option<SubscriptionTier>,
    },

    /// Mark a shown recommendation as helpful or not
    Feedback {
        /// Recommendation id, e.g. activity.run
        recommendation_id: String,

        /// The recommendation was helpful
        #[arg(long, conflicts_with = "not_helpful", required_unless_present = "not_helpful")]
        helpful: bool,

        /// The recommendation was not helpful
        #[arg(long)]
        not_helpful: bool,
    },

    /// Show recently shown recommendations
    History,

    /// Read or write a user preference
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },

    /// Check the built-in catalogs for inconsistencies
    Catalog,

    /// Show the config file location and validation results
    Config,
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Print a preference value
    Get {
        key: String,

        /// Value printed when the preference is unset
        #[arg(long, default_value = "")]
        default: String,
    },

    /// Store a preference value
    Set { key: String, value: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Celsius,
    Fahrenheit,
}

impl From<UnitArg> for TemperatureUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Celsius => TemperatureUnit::Celsius,
            UnitArg::Fahrenheit => TemperatureUnit::Fahrenheit,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = skycast_core::init() {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        match e.downcast_ref::<AppError>() {
            Some(app_err) => eprintln!("Error: {}", app_err.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Catalog => return catalog(cli.json),
        Commands::Config => return config(cli.json),
        _ => {}
    }

    let mut app = App::new().context("Failed to start SkyCast")?;

    match cli.command {
        Commands::Now {
            lat,
            lon,
            tier,
            no_record,
        } => {
            let explicit = lat.zip(lon).map(|(lat, lon)| Location::new(lat, lon));
            let (location_id, location) = app.resolve_location(explicit)?;
            let snapshot = app.current_snapshot(&location).await?;
            let gated = app.recommend(&snapshot, tier);

            if !no_record {
                let written = app.record_shown(&gated, &location_id, &snapshot)?;
                tracing::debug!("Recorded {} shown recommendations", written);
            }

            print_recommendations(&snapshot, &gated, cli.json)?;
        }
        Commands::Manual {
            temperature,
            condition,
            unit,
            tier,
        } => {
            let unit = unit
                .map(TemperatureUnit::from)
                .unwrap_or(app.config().weather.temperature_unit);
            let snapshot = WeatherSnapshot::in_unit(temperature, unit, condition.join(" "));
            let gated = app.recommend(&snapshot, tier);
            print_recommendations(&snapshot, &gated, cli.json)?;
        }
        Commands::Feedback {
            recommendation_id,
            helpful,
            ..
        } => {
            if !require_user(&app) {
                return Ok(());
            }
            app.service()
                .save_user_feedback(&recommendation_id, helpful)
                .map_err(AppError::from)?;
            println!("Feedback saved for {}", recommendation_id);
        }
        Commands::History => {
            let records = app.service().recommendation_history().map_err(AppError::from)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No recommendation history.");
            } else {
                for record in &records {
                    let feedback = match record.feedback {
                        Some(true) => "helpful",
                        Some(false) => "not helpful",
                        None => "-",
                    };
                    println!(
                        "{}  {:<14} {:<28} {:>5.1}°C {:<20} {}",
                        record.timestamp.format("%Y-%m-%d %H:%M"),
                        record.recommendation_type,
                        record.recommendation_id,
                        record.temperature,
                        record.weather_condition,
                        feedback
                    );
                }
            }
        }
        Commands::Prefs { action } => match action {
            PrefsAction::Get { key, default } => {
                println!("{}", app.service().user_preference(&key, &default));
            }
            PrefsAction::Set { key, value } => {
                if !require_user(&app) {
                    return Ok(());
                }
                app.service_mut()
                    .save_user_preference(&key, &value)
                    .map_err(AppError::from)?;
                println!("{} = {}", key, value);
            }
        },
        Commands::Catalog | Commands::Config => {}
    }

    app.shutdown();
    Ok(())
}

fn require_user(app: &App) -> bool {
    if app.service().user_id().is_some() {
        return true;
    }
    eprintln!(
        "Not signed in. Set user_id in the config file or {}.",
        skycast_core::config::USER_ID_ENV
    );
    false
}

fn catalog(json: bool) -> Result<()> {
    let catalog = skycast_recommend::Catalog::builtin();
    let issues = catalog.validate();

    if json {
        let issues: Vec<_> = issues.iter().map(ToString::to_string).collect();
        println!(
            "{}",
            serde_json::json!({
                "activities": catalog.activities.len(),
                "clothing": catalog.clothing.len(),
                "transportation": catalog.transportation.len(),
                "health": catalog.health.len(),
                "issues": issues,
            })
        );
    } else {
        println!("Activities:      {}", catalog.activities.len());
        println!("Clothing:        {}", catalog.clothing.len());
        println!("Transportation:  {}", catalog.transportation.len());
        println!("Health:          {}", catalog.health.len());
        for issue in &issues {
            println!("  ✗ {}", issue);
        }
    }

    if !issues.is_empty() {
        anyhow::bail!("{} catalog issue(s) found", issues.len());
    }
    Ok(())
}

fn config(json: bool) -> Result<()> {
    let path = Config::config_path()?;
    let config = Config::load_from(&path)?;
    let validation = config.validate();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "path": path.display().to_string(),
                "errors": validation.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "warnings": validation.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
            })
        );
    } else {
        println!("Config file: {}", path.display());
        println!("Database:    {}", config.database_path().display());
        for error in &validation.errors {
            println!("  ✗ {}", error);
        }
        for warning in &validation.warnings {
            println!("  ! {}", warning);
        }
    }

    if !validation.is_valid() {
        anyhow::bail!("Invalid configuration: {}", validation.error_summary());
    }
    Ok(())
}

fn print_recommendations(
    snapshot: &WeatherSnapshot,
    gated: &GatedRecommendations,
    json: bool,
) -> Result<()> {
    if json {
        let payload = serde_json::json!({
            "weather": snapshot,
            "recommendations": gated,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{:.1}°C, {}", snapshot.temperature, snapshot.condition);

    let items = gated.visible_items();
    if items.is_empty() {
        println!("\nNo recommendations for these conditions.");
        return Ok(());
    }

    let mut current = None;
    for item in &items {
        let kind = item.kind();
        if current != Some(kind) {
            println!("\n{}", heading(item));
            current = Some(kind);
        }
        println!("  {:<24} {}", item.label(), item.description());
    }

    let hidden = gated.hidden_count();
    if hidden > 0 {
        println!(
            "\n{} more recommendation(s) available with {:?}.",
            hidden,
            SubscriptionTier::Premium
        );
    }
    Ok(())
}

fn heading(item: &RecommendationItem) -> &'static str {
    match item {
        RecommendationItem::Activity(_) => "Activities",
        RecommendationItem::Clothing(_) => "Clothing",
        RecommendationItem::Transportation(_) => "Getting around",
        RecommendationItem::Health(_) => "Health advisories",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_manual_with_multiword_condition() {
        let cli = Cli::try_parse_from(["skycast", "manual", "-3", "Light", "Snow"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Manual { temperature, ref condition, .. })
                if temperature == -3.0 && condition.join(" ") == "Light Snow"
        ));
    }

    #[test]
    fn test_feedback_requires_a_verdict() {
        assert!(Cli::try_parse_from(["skycast", "feedback", "activity.run"]).is_err());
        assert!(Cli::try_parse_from(["skycast", "feedback", "activity.run", "--not-helpful"]).is_ok());
        assert!(Cli::try_parse_from([
            "skycast",
            "feedback",
            "activity.run",
            "--helpful",
            "--not-helpful"
        ])
        .is_err());
    }

    #[test]
    fn test_manual_unit_is_optional() {
        let cli = Cli::try_parse_from(["skycast", "manual", "50", "Clear"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Manual { unit: None, .. })
        ));

        let cli = Cli::try_parse_from(["skycast", "manual", "50", "Clear", "--unit", "fahrenheit"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Manual {
                unit: Some(UnitArg::Fahrenheit),
                ..
            })
        ));
    }

    #[test]
    fn test_parse_tier() {
        let cli = Cli::try_parse_from(["skycast", "manual", "20", "Clear", "--tier", "premium"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Manual {
                tier: Some(SubscriptionTier::Premium),
                ..
            })
        ));
    }
}

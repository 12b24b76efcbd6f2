use std::{future::Future, ops::RangeInclusive, time::Duration};

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, MultiSelect, Select, Text};
use tokio::time::MissedTickBehavior;
use windchill_core::{
    City, ColdSeverity, Config, ForecastProvider, ProviderId,
    city::resolve_cities,
    config::{MAX_REFRESH_SECS, MIN_REFRESH_SECS},
    model::{MAX_FORECAST_HOURS, MIN_FORECAST_HOURS},
    provider::{default_provider_from_config, provider_from_config},
    try_wind_chill,
};

use crate::{fetch, render};

const HOURS_RANGE: RangeInclusive<u64> = MIN_FORECAST_HOURS as u64..=MAX_FORECAST_HOURS as u64;
const INTERVAL_RANGE: RangeInclusive<u64> = MIN_REFRESH_SECS..=MAX_REFRESH_SECS;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "windchill", version, about = "Live wind chill forecasts in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that fetches forecasts.
#[derive(Debug, Args)]
pub struct ForecastArgs {
    /// Cities to include; defaults to the configured cities.
    pub cities: Vec<String>,

    /// Number of forecast hours to show (12-72).
    #[arg(long, value_parser = clap::value_parser!(u64).range(HOURS_RANGE))]
    pub hours: Option<u64>,

    /// Provider to use instead of the configured default: "open-meteo" or "met-no".
    #[arg(long)]
    pub provider: Option<String>,

    /// Extreme cold alert threshold in °C.
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<f64>,

    /// Print JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the default provider, cities and thresholds.
    Configure,

    /// Compute wind chill for a single temperature and wind speed.
    Calc {
        /// Air temperature in °C.
        #[arg(long, allow_negative_numbers = true)]
        temp: f64,

        /// Wind speed at 10 m in km/h.
        #[arg(long, allow_negative_numbers = true)]
        wind: f64,
    },

    /// List the supported cities.
    Cities,

    /// Show the hourly forecast table for each city.
    Show(ForecastArgs),

    /// Rank cities by wind chill at the end of the forecast window.
    Leaderboard(ForecastArgs),

    /// Refresh the leaderboard and alerts periodically until Ctrl-C.
    Watch {
        #[command(flatten)]
        args: ForecastArgs,

        /// Seconds between refreshes (10-600).
        #[arg(long, value_parser = clap::value_parser!(u64).range(INTERVAL_RANGE))]
        interval: Option<u64>,
    },
}

/// Config merged with per-invocation flags.
struct Session {
    provider: Box<dyn ForecastProvider>,
    cities: Vec<City>,
    hours: usize,
    alert_threshold_c: f64,
    json: bool,
}

impl Session {
    fn new(config: &Config, args: &ForecastArgs) -> anyhow::Result<Self> {
        let provider = match args.provider.as_deref() {
            Some(name) => provider_from_config(ProviderId::try_from(name)?, config)?,
            None => default_provider_from_config(config)?,
        };

        let cities = if args.cities.is_empty() {
            config.cities()?
        } else {
            resolve_cities(args.cities.as_slice())?
        };

        Ok(Self {
            provider,
            cities,
            hours: args.hours.map(|h| h as usize).unwrap_or_else(|| config.hours()),
            alert_threshold_c: args.threshold.unwrap_or_else(|| config.alert_threshold_c()),
            json: args.json,
        })
    }

    async fn refresh(&self) -> fetch::Refresh {
        fetch::refresh(
            self.provider.as_ref(),
            &self.cities,
            self.hours,
            self.alert_threshold_c,
        )
        .await
    }

    /// One-shot refresh: partial failures are tolerated, total failure is not.
    async fn refresh_once(&self) -> anyhow::Result<fetch::Refresh> {
        let out = self.refresh().await;
        if out.snapshot.forecasts.is_empty() {
            if let Some((city, err)) = out.failures.into_iter().next() {
                return Err(err.context(format!(
                    "Could not fetch a forecast for any city (first failure: {city})"
                )));
            }
            return Err(anyhow!("No cities selected"));
        }
        Ok(out)
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Calc { temp, wind } => {
                let chill = try_wind_chill(temp, wind).context("Invalid input")?;
                println!(
                    "Wind chill: {chill:.1} °C ({})",
                    render::severity_label(ColdSeverity::classify(chill))
                );
            }
            Command::Cities => print!("{}", render::cities_table(&City::all())),
            Command::Show(args) => {
                let session = Session::new(&Config::load()?, &args)?;
                let out = session.refresh_once().await?;

                if session.json {
                    println!("{}", render::snapshot_json(&out.snapshot)?);
                } else {
                    for fc in &out.snapshot.forecasts {
                        println!("{}", render::forecast_table(fc, session.alert_threshold_c));
                    }
                    let alerts = &out.snapshot.alerts;
                    print!("{}", render::alerts_text(alerts, session.alert_threshold_c));
                }
            }
            Command::Leaderboard(args) => {
                let session = Session::new(&Config::load()?, &args)?;
                let out = session.refresh_once().await?;

                if session.json {
                    let json = serde_json::to_string_pretty(&out.snapshot.leaderboard)
                        .context("Failed to serialize leaderboard")?;
                    println!("{json}");
                } else {
                    print!("{}", render::leaderboard_table(&out.snapshot.leaderboard));
                }
            }
            Command::Watch { args, interval } => {
                let config = Config::load()?;
                let session = Session::new(&config, &args)?;
                let secs = interval.unwrap_or_else(|| config.refresh_secs());
                watch(&session, Duration::from_secs(secs), tokio::signal::ctrl_c()).await?;
            }
        }

        Ok(())
    }
}

/// Refresh every `every` until `shutdown` resolves. Shutdown is also raced
/// against an in-flight refresh so a slow provider cannot delay it.
async fn watch<F>(session: &Session, every: Duration, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    tracing::info!(
        provider = %session.provider.id(),
        cities = session.cities.len(),
        interval_secs = every.as_secs(),
        "watching wind chill, press Ctrl-C to stop"
    );

    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            res = &mut shutdown => return stop(res),
        }

        let out = tokio::select! {
            out = session.refresh() => out,
            res = &mut shutdown => return stop(res),
        };

        print_refresh(session, &out)?;
    }
}

fn stop(res: std::io::Result<()>) -> anyhow::Result<()> {
    res.context("Failed to listen for Ctrl-C")?;
    tracing::info!("stopping");
    Ok(())
}

fn print_refresh(session: &Session, out: &fetch::Refresh) -> anyhow::Result<()> {
    if session.json {
        let json = serde_json::to_string(&out.snapshot).context("Failed to serialize snapshot")?;
        println!("{json}");
        return Ok(());
    }

    println!("--- {} UTC ---", out.snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S"));
    print!("{}", render::leaderboard_table(&out.snapshot.leaderboard));
    print!("{}", render::alerts_text(&out.snapshot.alerts, session.alert_threshold_c));
    if !out.failures.is_empty() {
        let names: Vec<&str> = out.failures.iter().map(|(c, _)| c.as_str()).collect();
        println!("(retrying next refresh: {})", names.join(", "));
    }
    println!();

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let providers = ProviderId::all().to_vec();
    let current = config.default_provider_id().unwrap_or(ProviderId::OpenMeteo);
    let cursor = providers.iter().position(|p| *p == current).unwrap_or(0);
    let provider = Select::new("Default forecast provider:", providers)
        .with_starting_cursor(cursor)
        .prompt()?;
    config.set_default_provider(provider);

    if provider == ProviderId::MetNo {
        let ua = Text::new("User-Agent for MET Norway (app name and contact email):")
            .with_initial_value(config.user_agent.as_deref().unwrap_or(""))
            .prompt()?;
        let ua = ua.trim();
        if ua.is_empty() {
            return Err(anyhow!("MET Norway requires a non-empty User-Agent"));
        }
        config.user_agent = Some(ua.to_string());
    }

    let all = City::all();
    let selected: Vec<String> = config.cities()?.into_iter().map(|c| c.name).collect();
    let defaults: Vec<usize> = all
        .iter()
        .enumerate()
        .filter(|(_, c)| selected.contains(&c.name))
        .map(|(i, _)| i)
        .collect();
    let cities = MultiSelect::new("Default cities:", all).with_default(&defaults).prompt()?;
    config.default_cities = cities.into_iter().map(|c| c.name).collect();

    let hours = CustomType::<usize>::new("Forecast hours (12-72):")
        .with_default(config.hours())
        .prompt()?;
    config.hours = Some(hours.clamp(MIN_FORECAST_HOURS, MAX_FORECAST_HOURS));

    let refresh = CustomType::<u64>::new("Refresh interval in seconds (10-600):")
        .with_default(config.refresh_secs())
        .prompt()?;
    config.refresh_secs = Some(refresh.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS));

    let threshold = CustomType::<f64>::new("Extreme cold alert threshold (°C):")
        .with_default(config.alert_threshold_c())
        .prompt()?;
    config.alert_threshold_c = Some(threshold);

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

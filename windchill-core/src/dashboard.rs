//! Cross-city views derived from one round of forecasts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{chill::ColdSeverity, model::CityForecast};

/// Default alert threshold for extreme cold, in °C of wind chill.
pub const DEFAULT_ALERT_THRESHOLD_C: f64 = -20.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub city: String,
    pub timestamp_utc: DateTime<Utc>,
    pub temperature_c: f64,
    pub wind_chill_c: f64,
    pub severity: ColdSeverity,
}

/// Cities ranked by wind chill at the end of the forecast window, coldest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Leaderboard {
    pub rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    pub fn build(forecasts: &[CityForecast]) -> Self {
        let mut rows: Vec<LeaderboardRow> = forecasts
            .iter()
            .filter_map(|fc| {
                let (sample, chill) = fc.latest()?;
                Some(LeaderboardRow {
                    city: fc.city.name.clone(),
                    timestamp_utc: sample.timestamp_utc,
                    temperature_c: sample.temperature_c,
                    wind_chill_c: chill.wind_chill_c,
                    severity: chill.severity(),
                })
            })
            .collect();

        rows.sort_by(|a, b| a.wind_chill_c.total_cmp(&b.wind_chill_c));
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColdAlert {
    pub city: String,
    pub wind_chill_c: f64,
    pub timestamp_utc: DateTime<Utc>,
}

/// Cities whose coldest wind chill in the window is at or below `threshold_c`.
pub fn extreme_cold_alerts(forecasts: &[CityForecast], threshold_c: f64) -> Vec<ColdAlert> {
    forecasts
        .iter()
        .filter_map(|fc| {
            let coldest = fc.coldest()?;
            (coldest.wind_chill_c <= threshold_c).then(|| ColdAlert {
                city: fc.city.name.clone(),
                wind_chill_c: coldest.wind_chill_c,
                timestamp_utc: coldest.timestamp_utc,
            })
        })
        .collect()
}

/// Everything one refresh produces.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub fetched_at: DateTime<Utc>,
    pub alert_threshold_c: f64,
    pub forecasts: Vec<CityForecast>,
    pub leaderboard: Leaderboard,
    pub alerts: Vec<ColdAlert>,
}

impl Snapshot {
    pub fn new(forecasts: Vec<CityForecast>, alert_threshold_c: f64) -> Self {
        let leaderboard = Leaderboard::build(&forecasts);
        let alerts = extreme_cold_alerts(&forecasts, alert_threshold_c);

        Self {
            fetched_at: Utc::now(),
            alert_threshold_c,
            forecasts,
            leaderboard,
            alerts,
        }
    }
}

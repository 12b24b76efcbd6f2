use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    chill::{ColdSeverity, wind_chill},
    city::City,
    provider::ProviderId,
};

pub const MIN_FORECAST_HOURS: usize = 12;
pub const MAX_FORECAST_HOURS: usize = 72;
pub const DEFAULT_FORECAST_HOURS: usize = 24;

#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub city: City,
    pub hours: usize,
}

impl ForecastRequest {
    /// `hours` is clamped to the supported forecast window.
    pub fn new(city: City, hours: usize) -> Self {
        Self {
            city,
            hours: hours.clamp(MIN_FORECAST_HOURS, MAX_FORECAST_HOURS),
        }
    }
}

/// One hourly forecast point as delivered by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp_utc: DateTime<Utc>,
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindChillResult {
    pub timestamp_utc: DateTime<Utc>,
    pub wind_chill_c: f64,
}

impl WindChillResult {
    pub fn from_sample(sample: &ForecastSample) -> Self {
        Self {
            timestamp_utc: sample.timestamp_utc,
            wind_chill_c: wind_chill(sample.temperature_c, sample.wind_speed_kmh),
        }
    }

    pub fn severity(&self) -> ColdSeverity {
        ColdSeverity::classify(self.wind_chill_c)
    }
}

/// Hourly samples for one city, in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityForecast {
    pub city: City,
    pub provider: ProviderId,
    pub samples: Vec<ForecastSample>,
}

impl CityForecast {
    pub fn wind_chill(&self) -> Vec<WindChillResult> {
        self.samples.iter().map(WindChillResult::from_sample).collect()
    }

    /// Last sample in the requested window, together with its wind chill.
    pub fn latest(&self) -> Option<(ForecastSample, WindChillResult)> {
        self.samples.last().map(|s| (*s, WindChillResult::from_sample(s)))
    }

    /// The lowest wind chill in the window; the earliest one wins ties.
    pub fn coldest(&self) -> Option<WindChillResult> {
        self.samples
            .iter()
            .map(WindChillResult::from_sample)
            .reduce(|min, r| {
                if r.wind_chill_c < min.wind_chill_c {
                    r
                } else {
                    min
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(hour: u32, temperature_c: f64, wind_speed_kmh: f64) -> ForecastSample {
        ForecastSample {
            timestamp_utc: Utc.with_ymd_and_hms(2025, 1, 15, hour, 0, 0).unwrap(),
            temperature_c,
            wind_speed_kmh,
        }
    }

    fn forecast(samples: Vec<ForecastSample>) -> CityForecast {
        CityForecast {
            city: City::new("Oslo", 59.91, 10.75),
            provider: ProviderId::OpenMeteo,
            samples,
        }
    }

    #[test]
    fn request_hours_are_clamped() {
        let oslo = City::new("Oslo", 59.91, 10.75);
        assert_eq!(ForecastRequest::new(oslo.clone(), 1).hours, MIN_FORECAST_HOURS);
        assert_eq!(ForecastRequest::new(oslo.clone(), 500).hours, MAX_FORECAST_HOURS);
        assert_eq!(ForecastRequest::new(oslo, 36).hours, 36);
    }

    #[test]
    fn result_keeps_sample_timestamp() {
        let s = sample(3, -10.0, 20.0);
        let r = WindChillResult::from_sample(&s);
        assert_eq!(r.timestamp_utc, s.timestamp_utc);
        assert_eq!(r.wind_chill_c, wind_chill(-10.0, 20.0));
    }

    #[test]
    fn coldest_and_latest() {
        let fc = forecast(vec![
            sample(0, -2.0, 10.0),
            sample(1, -8.0, 30.0),
            sample(2, -8.0, 30.0),
            sample(3, 1.0, 2.0),
        ]);

        let coldest = fc.coldest().expect("non-empty forecast");
        assert_eq!(coldest.timestamp_utc, fc.samples[1].timestamp_utc);

        let (latest, chill) = fc.latest().expect("non-empty forecast");
        assert_eq!(latest, fc.samples[3]);
        assert_eq!(chill.wind_chill_c, 1.0);
        assert_eq!(fc.wind_chill().len(), 4);
    }

    #[test]
    fn empty_forecast_has_no_extremes() {
        let fc = forecast(Vec::new());
        assert!(fc.coldest().is_none());
        assert!(fc.latest().is_none());
    }
}

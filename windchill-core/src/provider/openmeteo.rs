use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    chill::try_wind_chill,
    model::{CityForecast, ForecastRequest, ForecastSample},
    provider::{ProviderId, http_client, truncate_body},
};

use super::ForecastProvider;

const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Keyless client for the Open-Meteo hourly forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new() -> Result<Self> {
        Self::with_base_url(OPEN_METEO_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            http: http_client(None)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    #[serde(alias = "wind_speed_10m")]
    windspeed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    hourly: OmHourly,
}

/// Zip the column arrays into samples, dropping hours with missing or
/// implausible values, and keep at most `hours` of them.
fn samples_from_hourly(hourly: OmHourly, hours: usize) -> Result<Vec<ForecastSample>> {
    if hourly.time.len() != hourly.temperature_2m.len()
        || hourly.time.len() != hourly.windspeed_10m.len()
    {
        return Err(anyhow!(
            "Open-Meteo hourly arrays differ in length (time={}, temperature={}, wind={})",
            hourly.time.len(),
            hourly.temperature_2m.len(),
            hourly.windspeed_10m.len(),
        ));
    }

    let mut samples = Vec::with_capacity(hours.min(hourly.time.len()));

    for ((time, temp), wind) in hourly
        .time
        .iter()
        .zip(hourly.temperature_2m)
        .zip(hourly.windspeed_10m)
        .take(hours)
    {
        let (Some(temperature_c), Some(wind_speed_kmh)) = (temp, wind) else {
            tracing::debug!(%time, "skipping hour with missing values");
            continue;
        };

        if let Err(e) = try_wind_chill(temperature_c, wind_speed_kmh) {
            tracing::warn!(%time, error = %e, "skipping implausible Open-Meteo sample");
            continue;
        }

        let timestamp_utc = NaiveDateTime::parse_from_str(time, TIME_FORMAT)
            .with_context(|| format!("Invalid Open-Meteo timestamp '{time}'"))?
            .and_utc();

        samples.push(ForecastSample {
            timestamp_utc,
            temperature_c,
            wind_speed_kmh,
        });
    }

    Ok(samples)
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }

    async fn fetch_forecast(&self, request: &ForecastRequest) -> Result<CityForecast> {
        let city = &request.city;
        tracing::debug!(city = %city, hours = request.hours, "fetching Open-Meteo forecast");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", city.latitude.to_string()),
                ("longitude", city.longitude.to_string()),
                ("hourly", "temperature_2m,windspeed_10m".to_string()),
                ("windspeed_unit", "kmh".to_string()),
                ("timezone", "UTC".to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to Open-Meteo for {city}"))?;

        let status = res.status();
        let body = res.text().await.context("Failed to read Open-Meteo response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OmResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo forecast JSON")?;

        let samples = samples_from_hourly(parsed.hourly, request.hours)?;
        if samples.is_empty() {
            return Err(anyhow!(
                "Open-Meteo response for {city} contained no usable hourly data"
            ));
        }

        Ok(CityForecast {
            city: city.clone(),
            provider: ProviderId::OpenMeteo,
            samples,
        })
    }
}

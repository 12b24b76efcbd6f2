//! MET Norway Locationforecast 2.0 (the API behind yr.no).
//!
//! See: https://api.met.no/weatherapi/locationforecast/2.0/documentation

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    chill::try_wind_chill,
    model::{CityForecast, ForecastRequest, ForecastSample},
    provider::{ProviderId, http_client, truncate_body},
};

use super::ForecastProvider;

const MET_NO_URL: &str = "https://api.met.no/weatherapi/locationforecast/2.0/compact";
const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Clone)]
pub struct MetNoProvider {
    base_url: String,
    http: Client,
}

impl MetNoProvider {
    /// MET Norway rejects requests without an identifying `User-Agent`.
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::with_base_url(MET_NO_URL, user_agent)
    }

    pub fn with_base_url(base_url: impl Into<String>, user_agent: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            http: http_client(Some(user_agent))?,
        })
    }
}

// --- Locationforecast JSON response types ---

#[derive(Debug, Deserialize)]
struct MetResponse {
    properties: MetProperties,
}

#[derive(Debug, Deserialize)]
struct MetProperties {
    timeseries: Vec<MetTimeseries>,
}

#[derive(Debug, Deserialize)]
struct MetTimeseries {
    time: DateTime<Utc>,
    data: MetData,
}

#[derive(Debug, Deserialize)]
struct MetData {
    instant: MetInstant,
}

#[derive(Debug, Deserialize)]
struct MetInstant {
    details: MetInstantDetails,
}

#[derive(Debug, Deserialize)]
struct MetInstantDetails {
    air_temperature: Option<f64>,
    /// m/s
    wind_speed: Option<f64>,
}

/// Keep the entries inside the first `hours` hours, anchored at the first
/// entry. The series turns 6-hourly after about 60 h, so counting entries
/// would stretch the window well past the requested end.
fn samples_from_timeseries(series: Vec<MetTimeseries>, hours: usize) -> Vec<ForecastSample> {
    let Some(first) = series.first().map(|entry| entry.time) else {
        return Vec::new();
    };
    let window_end = first + Duration::hours(hours as i64);

    series
        .into_iter()
        .take_while(|entry| entry.time < window_end)
        .filter_map(|entry| {
            let details = entry.data.instant.details;
            let temperature_c = details.air_temperature?;
            let wind_speed_kmh = details.wind_speed? * MPS_TO_KMH;

            match try_wind_chill(temperature_c, wind_speed_kmh) {
                Ok(_) => Some(ForecastSample {
                    timestamp_utc: entry.time,
                    temperature_c,
                    wind_speed_kmh,
                }),
                Err(e) => {
                    tracing::warn!(
                        time = %entry.time,
                        error = %e,
                        "skipping implausible MET Norway sample"
                    );
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl ForecastProvider for MetNoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::MetNo
    }

    async fn fetch_forecast(&self, request: &ForecastRequest) -> Result<CityForecast> {
        let city = &request.city;
        tracing::debug!(city = %city, hours = request.hours, "fetching MET Norway forecast");

        // MET Norway asks for at most four decimals in coordinates.
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", format!("{:.4}", city.latitude)),
                ("lon", format!("{:.4}", city.longitude)),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to MET Norway for {city}"))?;

        let status = res.status();
        let body = res.text().await.context("Failed to read MET Norway response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "MET Norway request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: MetResponse =
            serde_json::from_str(&body).context("Failed to parse MET Norway forecast JSON")?;

        let samples = samples_from_timeseries(parsed.properties.timeseries, request.hours);
        if samples.is_empty() {
            return Err(anyhow!(
                "MET Norway response for {city} contained no usable timeseries"
            ));
        }

        Ok(CityForecast {
            city: city.clone(),
            provider: ProviderId::MetNo,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::City;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{header, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UA: &str = "windchill-test/0.1 ops@example.com";

    fn fixture() -> serde_json::Value {
        json!({
            "type": "Feature",
            "properties": {
                "meta": { "updated_at": "2025-01-15T00:00:00Z" },
                "timeseries": [
                    { "time": "2025-01-15T00:00:00Z",
                      "data": { "instant": { "details": { "air_temperature": -12.0, "wind_speed": 5.0 } } } },
                    { "time": "2025-01-15T01:00:00Z",
                      "data": { "instant": { "details": { "air_temperature": -13.0 } } } },
                    { "time": "2025-01-15T02:00:00Z",
                      "data": { "instant": { "details": { "air_temperature": -14.0, "wind_speed": 1.0 } } } }
                ]
            }
        })
    }

    #[test]
    fn converts_wind_to_kmh_and_skips_gaps() {
        let parsed: MetResponse = serde_json::from_value(fixture()).expect("valid fixture");
        let samples = samples_from_timeseries(parsed.properties.timeseries, 24);

        assert_eq!(samples.len(), 2);
        assert_eq!(
            samples[0].timestamp_utc,
            Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap()
        );
        assert!((samples[0].wind_speed_kmh - 18.0).abs() < 1e-9);
        assert_eq!(samples[1].temperature_c, -14.0);
    }

    #[test]
    fn window_is_measured_in_hours_not_entries() {
        let start = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();
        let entry = |offset_h: i64| {
            json!({
                "time": (start + Duration::hours(offset_h)).to_rfc3339(),
                "data": { "instant": { "details": { "air_temperature": -10.0, "wind_speed": 6.0 } } }
            })
        };
        // Hourly for the first 60 h, then 6-hourly out to 174 h.
        let mut series: Vec<serde_json::Value> = (0..60).map(entry).collect();
        series.extend((0..20).map(|i| entry(60 + 6 * i)));

        let parsed: MetResponse =
            serde_json::from_value(json!({ "properties": { "timeseries": series } }))
                .expect("valid fixture");
        let samples = samples_from_timeseries(parsed.properties.timeseries, 72);

        let last = samples.last().expect("window is not empty").timestamp_utc;
        assert!(last < start + Duration::hours(72), "window ends at {last}");
        assert_eq!(last, start + Duration::hours(66));
        // 60 hourly entries plus the 6-hourly ones at 60 and 66 h.
        assert_eq!(samples.len(), 62);
    }

    #[test]
    fn empty_timeseries_yields_no_samples() {
        assert!(samples_from_timeseries(Vec::new(), 24).is_empty());
    }

    #[tokio::test]
    async fn sends_user_agent_and_rounded_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", UA))
            .and(query_param("lat", "58.1500"))
            .and(query_param("lon", "7.9950"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = MetNoProvider::with_base_url(server.uri(), UA).expect("client builds");
        let request = ForecastRequest::new(City::new("Kristiansand", 58.15, 7.995), 24);

        let forecast = provider.fetch_forecast(&request).await.expect("mock returns data");
        assert_eq!(forecast.provider, ProviderId::MetNo);
        assert_eq!(forecast.samples.len(), 2);
    }

    #[tokio::test]
    async fn forbidden_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Missing user agent"))
            .mount(&server)
            .await;

        let provider = MetNoProvider::with_base_url(server.uri(), UA).expect("client builds");
        let request = ForecastRequest::new(City::new("Oslo", 59.91, 10.75), 24);

        let err = provider.fetch_forecast(&request).await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }
}

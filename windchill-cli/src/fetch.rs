use futures::future::join_all;
use windchill_core::{City, CityForecast, ForecastProvider, ForecastRequest, Snapshot};

/// Result of one refresh round across all selected cities.
#[derive(Debug)]
pub struct Refresh {
    pub snapshot: Snapshot,
    pub failures: Vec<(String, anyhow::Error)>,
}

/// Fetch every city concurrently. A city that fails is logged and left out;
/// it is simply tried again on the next refresh.
pub async fn refresh(
    provider: &dyn ForecastProvider,
    cities: &[City],
    hours: usize,
    alert_threshold_c: f64,
) -> Refresh {
    let requests: Vec<ForecastRequest> = cities
        .iter()
        .cloned()
        .map(|c| ForecastRequest::new(c, hours))
        .collect();

    let results = join_all(requests.iter().map(|r| provider.fetch_forecast(r))).await;

    let mut forecasts: Vec<CityForecast> = Vec::with_capacity(results.len());
    let mut failures = Vec::new();

    for (request, result) in requests.into_iter().zip(results) {
        match result {
            Ok(fc) => forecasts.push(fc),
            Err(e) => {
                tracing::warn!(
                    city = %request.city,
                    provider = %provider.id(),
                    "forecast fetch failed: {e:#}"
                );
                failures.push((request.city.name, e));
            }
        }
    }

    tracing::debug!(ok = forecasts.len(), failed = failures.len(), "refresh complete");

    Refresh {
        snapshot: Snapshot::new(forecasts, alert_threshold_c),
        failures,
    }
}

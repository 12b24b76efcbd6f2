//! Plain-text tables for the terminal.

use std::fmt::Write;

use anyhow::Context;
use windchill_core::{City, CityForecast, ColdAlert, ColdSeverity, Leaderboard, Snapshot};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn forecast_table(forecast: &CityForecast, alert_threshold_c: f64) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} ({}, {} h)",
        forecast.city,
        forecast.provider,
        forecast.samples.len()
    );
    let _ = writeln!(
        out,
        "{:<17} {:>9} {:>11} {:>11}  {}",
        "Time (UTC)", "Temp °C", "Wind km/h", "Chill °C", ""
    );

    for (sample, chill) in forecast.samples.iter().zip(forecast.wind_chill()) {
        let marker = if chill.wind_chill_c <= alert_threshold_c { "!" } else { "" };
        let _ = writeln!(
            out,
            "{:<17} {:>9.1} {:>11.1} {:>11.1}  {}",
            sample.timestamp_utc.format(TIME_FORMAT),
            sample.temperature_c,
            sample.wind_speed_kmh,
            chill.wind_chill_c,
            marker,
        );
    }

    out
}

pub fn leaderboard_table(board: &Leaderboard) -> String {
    if board.is_empty() {
        return "No forecast data available.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<14} {:>9} {:>11}  {}",
        "#", "City", "Temp °C", "Chill °C", "Level"
    );

    for (rank, row) in board.rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<14} {:>9.1} {:>11.1}  {}",
            rank + 1,
            row.city,
            row.temperature_c,
            row.wind_chill_c,
            severity_label(row.severity),
        );
    }

    out
}

pub fn alerts_text(alerts: &[ColdAlert], alert_threshold_c: f64) -> String {
    if alerts.is_empty() {
        return format!(
            "No wind chill at or below {alert_threshold_c:.1} °C in the forecast window.\n"
        );
    }

    let mut out = format!("EXTREME COLD ALERT (wind chill <= {alert_threshold_c:.1} °C)\n");
    for alert in alerts {
        let _ = writeln!(
            out,
            "  {}: {:.1} °C at {} UTC",
            alert.city,
            alert.wind_chill_c,
            alert.timestamp_utc.format(TIME_FORMAT),
        );
    }
    out
}

pub fn cities_table(cities: &[City]) -> String {
    let mut out = String::new();
    for city in cities {
        let _ = writeln!(
            out,
            "{:<14} {:>8.3} {:>8.3}",
            city.name, city.latitude, city.longitude
        );
    }
    out
}

/// Pretty JSON for a whole snapshot: forecasts, leaderboard and alerts.
pub fn snapshot_json(snapshot: &Snapshot) -> anyhow::Result<String> {
    serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")
}

pub fn severity_label(severity: ColdSeverity) -> &'static str {
    match severity {
        ColdSeverity::Extreme => "EXTREME",
        ColdSeverity::Cold => "cold",
        ColdSeverity::Mild => "mild",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use windchill_core::{ForecastSample, ProviderId, dashboard::extreme_cold_alerts};

    fn oslo() -> CityForecast {
        let start = Utc.with_ymd_and_hms(2025, 1, 15, 6, 0, 0).unwrap();
        CityForecast {
            city: City::new("Oslo", 59.91, 10.75),
            provider: ProviderId::OpenMeteo,
            samples: vec![
                ForecastSample {
                    timestamp_utc: start,
                    temperature_c: -25.0,
                    wind_speed_kmh: 30.0,
                },
                ForecastSample {
                    timestamp_utc: start + chrono::Duration::hours(1),
                    temperature_c: 2.0,
                    wind_speed_kmh: 3.0,
                },
            ],
        }
    }

    #[test]
    fn forecast_table_marks_alert_rows() {
        let table = forecast_table(&oslo(), -20.0);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Oslo (open-meteo, 2 h)"));
        assert!(lines[2].starts_with("2025-01-15 06:00"));
        assert!(lines[2].ends_with('!'));
        assert!(lines[3].contains("2.0"));
        assert!(!lines[3].ends_with('!'));
    }

    #[test]
    fn leaderboard_lists_ranks() {
        let board = Leaderboard::build(&[oslo()]);
        let table = leaderboard_table(&board);
        assert!(table.lines().nth(1).unwrap().trim_start().starts_with("1  Oslo"));
        assert!(table.contains("mild"));
    }

    #[test]
    fn empty_leaderboard_message() {
        assert_eq!(
            leaderboard_table(&Leaderboard::default()),
            "No forecast data available.\n"
        );
    }

    #[test]
    fn alerts_text_lists_cities() {
        let alerts = extreme_cold_alerts(&[oslo()], -20.0);
        let text = alerts_text(&alerts, -20.0);
        assert!(text.starts_with("EXTREME COLD ALERT"));
        assert!(text.contains("Oslo"));
        assert!(text.contains("2025-01-15 06:00 UTC"));

        assert!(alerts_text(&[], -20.0).starts_with("No wind chill"));
    }

    #[test]
    fn snapshot_json_keeps_alerts() {
        let json = snapshot_json(&Snapshot::new(vec![oslo()], -20.0)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["forecasts"][0]["city"]["name"], "Oslo");
        assert_eq!(value["alerts"][0]["city"], "Oslo");
        assert_eq!(value["leaderboard"]["rows"].as_array().unwrap().len(), 1);
        assert_eq!(value["alert_threshold_c"], -20.0);
    }
}

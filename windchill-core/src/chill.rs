//! Wind chill index (Environment Canada / NWS 2001 formula, metric form).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Above this air temperature the formula is not applied.
pub const MAX_TEMPERATURE_C: f64 = 10.0;

/// Below this wind speed the air is considered calm and the formula is not applied.
pub const MIN_WIND_SPEED_KMH: f64 = 4.8;

/// Errors returned by [`try_wind_chill`] for inputs outside the physical domain.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum WindChillError {
    #[error("wind speed must not be negative, got {0} km/h")]
    NegativeWindSpeed(f64),

    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },
}

/// Perceived temperature in °C for the given air temperature and 10 m wind speed.
///
/// Outside the formula's envelope (warmer than 10 °C, or wind below 4.8 km/h)
/// the air temperature is returned unchanged. Negative wind speeds fall under
/// the calm branch, so the fractional power is only ever taken of a value
/// `>= 4.8`.
pub fn wind_chill(temperature_c: f64, wind_speed_kmh: f64) -> f64 {
    if temperature_c > MAX_TEMPERATURE_C || wind_speed_kmh < MIN_WIND_SPEED_KMH {
        return temperature_c;
    }

    let v = wind_speed_kmh.powf(0.16);
    13.12 + 0.6215 * temperature_c - 11.37 * v + 0.3965 * temperature_c * v
}

/// Validating variant of [`wind_chill`] used on data coming from the network.
pub fn try_wind_chill(temperature_c: f64, wind_speed_kmh: f64) -> Result<f64, WindChillError> {
    if !temperature_c.is_finite() {
        return Err(WindChillError::NonFinite { field: "temperature" });
    }
    if !wind_speed_kmh.is_finite() {
        return Err(WindChillError::NonFinite { field: "wind speed" });
    }
    if wind_speed_kmh < 0.0 {
        return Err(WindChillError::NegativeWindSpeed(wind_speed_kmh));
    }

    Ok(wind_chill(temperature_c, wind_speed_kmh))
}

/// Coarse bands used by the cold meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColdSeverity {
    Extreme,
    Cold,
    Mild,
}

impl ColdSeverity {
    pub const EXTREME_AT_OR_BELOW_C: f64 = -20.0;
    pub const COLD_AT_OR_BELOW_C: f64 = 0.0;

    pub fn classify(wind_chill_c: f64) -> Self {
        if wind_chill_c <= Self::EXTREME_AT_OR_BELOW_C {
            ColdSeverity::Extreme
        } else if wind_chill_c <= Self::COLD_AT_OR_BELOW_C {
            ColdSeverity::Cold
        } else {
            ColdSeverity::Mild
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColdSeverity::Extreme => "extreme",
            ColdSeverity::Cold => "cold",
            ColdSeverity::Mild => "mild",
        }
    }
}

impl std::fmt::Display for ColdSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

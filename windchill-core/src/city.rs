use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// A named forecast location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Look a city up in the built-in catalogue, ignoring case.
    pub fn lookup(name: &str) -> Result<Self> {
        let wanted = name.trim().to_lowercase();

        CATALOGUE
            .iter()
            .find(|(n, _, _)| n.to_lowercase() == wanted)
            .map(|&(n, lat, lon)| City::new(n, lat, lon))
            .ok_or_else(|| {
                anyhow!(
                    "Unknown city '{name}'.\n\
                     Hint: run `windchill cities` to list the supported cities."
                )
            })
    }

    pub fn all() -> Vec<City> {
        CATALOGUE
            .iter()
            .map(|&(n, lat, lon)| City::new(n, lat, lon))
            .collect()
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Resolve a list of names, failing on the first unknown one.
pub fn resolve_cities<S: AsRef<str>>(names: &[S]) -> Result<Vec<City>> {
    names.iter().map(|n| City::lookup(n.as_ref())).collect()
}

pub const DEFAULT_CITIES: &[&str] = &["Oslo", "Stavanger"];

// (name, latitude, longitude)
const CATALOGUE: &[(&str, f64, f64)] = &[
    ("Oslo", 59.91, 10.75),
    ("Bergen", 60.39, 5.32),
    ("Trondheim", 63.43, 10.39),
    ("Stavanger", 58.97, 5.73),
    ("Kristiansand", 58.15, 7.995),
    ("Drammen", 59.74, 10.20),
    ("Sandnes", 58.85, 5.735),
    ("Fredrikstad", 59.22, 10.93),
    ("Tromsø", 69.65, 18.96),
    ("Lillestrøm", 59.956, 11.049),
    ("Sarpsborg", 59.284, 11.11),
    ("Skien", 59.21, 9.61),
    ("Sandefjord", 59.131, 10.216),
    ("Haugesund", 59.414, 5.268),
    ("Moss", 59.464, 10.659),
    ("Porsgrunn", 59.139, 9.655),
    ("Bodø", 67.282, 14.375),
    ("Arendal", 58.462, 8.772),
    ("Hamar", 60.795, 11.068),
    ("Ålesund", 62.47, 6.15),
    ("Mo i Rana", 66.312, 14.128),
    ("Narvik", 68.438, 17.427),
    ("Alta", 69.968, 23.271),
    ("Molde", 62.737, 7.160),
    ("Notodden", 59.558, 9.249),
    ("Levanger", 63.744, 11.297),
    ("Namsos", 64.472, 11.494),
    ("Voss", 60.623, 6.419),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let city = City::lookup("  tROMSØ ").expect("Tromsø is in the catalogue");
        assert_eq!(city.name, "Tromsø");
        assert_eq!(city.latitude, 69.65);
    }

    #[test]
    fn lookup_unknown_city_has_hint() {
        let err = City::lookup("Atlantis").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown city 'Atlantis'"));
        assert!(msg.contains("windchill cities"));
    }

    #[test]
    fn default_cities_resolve() {
        let cities = resolve_cities(DEFAULT_CITIES).expect("defaults must be in the catalogue");
        assert_eq!(cities.len(), 2);
    }

    #[test]
    fn catalogue_names_are_unique() {
        let all = City::all();
        for (i, a) in all.iter().enumerate() {
            assert!(
                all[i + 1..].iter().all(|b| b.name != a.name),
                "duplicate {}",
                a.name
            );
        }
    }
}

use serde::{Deserialize, Serialize};

/// A single resolved location fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Measurement system sent to the weather API as the `units` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
            UnitSystem::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial, UnitSystem::Standard]
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            "standard" => Ok(UnitSystem::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial, standard."
            )),
        }
    }
}

/// Current conditions as reported by the weather API.
///
/// Values are trusted as-is: nothing checks that `temp_min <= temp_current <= temp_max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub condition_main: String,
    pub condition_description: String,
    pub temp_current: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity_percent: u32,
    pub wind_speed: f64,
    pub sunrise_unix: i64,
    pub sunset_unix: i64,
    pub location_name: String,
    pub country_code: String,
}

/// Render-ready projection of a successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    pub condition: String,
    pub description: String,
    pub unit_symbol: &'static str,
    pub temperature: String,
    pub temp_min: String,
    pub temp_max: String,
    pub humidity: String,
    pub wind_speed: String,
    pub sunrise: String,
    pub sunset: String,
    pub location_name: String,
    pub country_code: String,
}

impl DisplayModel {
    /// Projects an observation using an already resolved unit symbol and
    /// already formatted sunrise/sunset strings.
    pub fn project(
        observation: WeatherObservation,
        unit_symbol: &'static str,
        sunrise: String,
        sunset: String,
    ) -> Self {
        Self {
            temperature: format!("{}{}", observation.temp_current, unit_symbol),
            temp_min: format!("{} min", observation.temp_min),
            temp_max: format!("{} max", observation.temp_max),
            humidity: format!("{} per cent", observation.humidity_percent),
            wind_speed: observation.wind_speed.to_string(),
            condition: observation.condition_main,
            description: observation.condition_description,
            unit_symbol,
            sunrise,
            sunset,
            location_name: observation.location_name,
            country_code: observation.country_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation() -> WeatherObservation {
        WeatherObservation {
            condition_main: "Clouds".into(),
            condition_description: "broken clouds".into(),
            temp_current: 14.5,
            temp_min: 16.0,
            temp_max: 12.0,
            humidity_percent: 81,
            wind_speed: 4.1,
            sunrise_unix: 0,
            sunset_unix: 0,
            location_name: "San Francisco".into(),
            country_code: "US".into(),
        }
    }

    #[test]
    fn project_formats_text_fields() {
        let model = DisplayModel::project(observation(), "°C", "06:59".into(), "19:12".into());

        assert_eq!(model.temperature, "14.5°C");
        assert_eq!(model.humidity, "81 per cent");
        assert_eq!(model.wind_speed, "4.1");
        assert_eq!(model.sunrise, "06:59");
        assert_eq!(model.country_code, "US");
    }

    #[test]
    fn project_keeps_inverted_min_max() {
        let model = DisplayModel::project(observation(), "°F", String::new(), String::new());

        assert_eq!(model.temp_min, "16 min");
        assert_eq!(model.temp_max, "12 max");
    }

    #[test]
    fn unit_system_parses_case_insensitively() {
        assert_eq!(UnitSystem::try_from("Imperial").unwrap(), UnitSystem::Imperial);
        assert!(UnitSystem::try_from("kelvin").is_err());
    }
}

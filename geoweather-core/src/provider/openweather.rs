use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::FetchError,
    model::{Coordinates, UnitSystem, WeatherObservation},
};

use super::WeatherProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the OpenWeather current-weather endpoint (`GET {base}/weather`).
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    endpoint: Url,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .with_context(|| format!("Invalid weather API base URL: {base_url}"))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join("weather")
            .with_context(|| format!("Failed to build weather endpoint from {base_url}"))?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u32,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: Option<String>,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    sys: OwSys,
}

impl From<OwCurrentResponse> for WeatherObservation {
    fn from(raw: OwCurrentResponse) -> Self {
        let (condition_main, condition_description) = raw
            .weather
            .into_iter()
            .next()
            .map(|w| (w.main, w.description))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

        WeatherObservation {
            condition_main,
            condition_description,
            temp_current: raw.main.temp,
            temp_min: raw.main.temp_min,
            temp_max: raw.main.temp_max,
            humidity_percent: raw.main.humidity,
            wind_speed: raw.wind.speed,
            sunrise_unix: raw.sys.sunrise,
            sunset_unix: raw.sys.sunset,
            location_name: raw.name,
            country_code: raw.sys.country.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[tracing::instrument(skip(self, api_key))]
    async fn fetch(
        &self,
        coords: Coordinates,
        units: UnitSystem,
        api_key: &str,
    ) -> Result<WeatherObservation, FetchError> {
        let res = self
            .http
            .get(self.endpoint.clone())
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("units", units.as_str().to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(
                %status,
                endpoint = %self.endpoint,
                body = %truncate_body(&body),
                "weather request failed"
            );
            return Err(FetchError::from_status(status));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        tracing::debug!(location = %parsed.name, "weather payload decoded");

        Ok(parsed.into())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

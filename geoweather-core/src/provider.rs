use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::FetchError,
    model::{Coordinates, UnitSystem, WeatherObservation},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// One current-weather lookup. Implementations never retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(
        &self,
        coords: Coordinates,
        units: UnitSystem,
        api_key: &str,
    ) -> Result<WeatherObservation, FetchError>;
}

//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - The location-to-weather pipeline ([`FetchOrchestrator`])
//! - Capability traits for location, permissions, network and display
//! - The OpenWeather client and the display projection helpers
//! - Configuration handling
//!
//! Hosts plug in their own location and permission sources and a display sink.

pub mod config;
pub mod display;
pub mod error;
pub mod location;
pub mod model;
pub mod network;
pub mod orchestrator;
pub mod permission;
pub mod provider;
pub mod time_format;
pub mod units;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use display::{DisplaySink, SettingsTarget};
pub use error::FetchError;
pub use location::{LocationAcquirer, LocationCapability, StaticLocationSource};
pub use model::{Coordinates, DisplayModel, UnitSystem, WeatherObservation};
pub use network::{DnsReachability, NetworkCapability};
pub use orchestrator::{Collaborators, FetchOrchestrator, PipelineSettings, RunReport, RunState};
pub use permission::{
    PermissionCapability, PermissionGate, PermissionOutcome, PermissionResponder, PermissionScope,
    StoredPermission,
};
pub use provider::{OpenWeatherClient, WeatherProvider};

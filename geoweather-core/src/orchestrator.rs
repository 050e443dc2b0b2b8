//! The location-to-weather pipeline.
//!
//! A run walks `Idle → CheckingService → AwaitingPermission → AcquiringLocation
//! → FetchingWeather` and ends in `Succeeded` or `Failed`. Any stage may fail,
//! which ends the run with exactly one [`FetchError`].
//!
//! Triggers that arrive while a run is in flight are queued and start, in
//! arrival order, once the current run has finished. Dropping a run future
//! cancels it: the location registration is released, an in-flight response is
//! discarded, and the display sink is not touched again.

use anyhow::Result;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::sync::Mutex;
use tracing::Instrument;

use crate::{
    config::Config,
    display::{DisplaySink, SettingsTarget},
    error::FetchError,
    location::{LocationAcquirer, LocationCapability},
    model::{Coordinates, DisplayModel, UnitSystem, WeatherObservation},
    network::{DnsReachability, NetworkCapability},
    permission::{LOCATION_SCOPES, PermissionCapability, PermissionGate, PermissionOutcome},
    provider::{OpenWeatherClient, WeatherProvider},
    time_format, units,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    CheckingService,
    AwaitingPermission,
    AcquiringLocation,
    FetchingWeather,
    Succeeded,
    Failed,
}

/// Values passed through to the weather request and the display projection.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub api_key: String,
    pub units: UnitSystem,
    pub locale: String,
    pub location_timeout: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            api_key: config.api_key()?.to_string(),
            units: config.units,
            locale: config.resolved_locale(),
            location_timeout: config.location_timeout(),
        })
    }
}

/// External collaborators of the pipeline.
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub location: Arc<dyn LocationCapability>,
    pub permissions: Arc<dyn PermissionCapability>,
    pub network: Arc<dyn NetworkCapability>,
    pub weather: Arc<dyn WeatherProvider>,
    pub sink: Arc<dyn DisplaySink>,
}

/// Result of one run together with the states it went through.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub transitions: Vec<RunState>,
    pub result: Result<DisplayModel, FetchError>,
}

impl RunReport {
    pub fn final_state(&self) -> RunState {
        self.transitions.last().copied().unwrap_or(RunState::Idle)
    }
}

/// State owned by a single run and discarded when it ends.
#[derive(Debug)]
struct RunContext {
    id: u64,
    state: RunState,
    transitions: Vec<RunState>,
}

impl RunContext {
    fn new(id: u64) -> Self {
        Self { id, state: RunState::Idle, transitions: vec![RunState::Idle] }
    }

    fn enter(&mut self, next: RunState) {
        tracing::debug!(run = self.id, from = ?self.state, to = ?next, "state transition");
        self.state = next;
        self.transitions.push(next);
    }

    fn finish(mut self, result: Result<DisplayModel, FetchError>) -> RunReport {
        match &result {
            Ok(_) => self.enter(RunState::Succeeded),
            Err(err) => {
                tracing::info!(run = self.id, error = %err, "run failed");
                self.enter(RunState::Failed);
            }
        }
        RunReport { transitions: self.transitions, result }
    }
}

#[derive(Debug)]
pub struct FetchOrchestrator {
    gate: PermissionGate,
    acquirer: LocationAcquirer,
    network: Arc<dyn NetworkCapability>,
    weather: Arc<dyn WeatherProvider>,
    sink: Arc<dyn DisplaySink>,
    settings: PipelineSettings,
    turn: Mutex<()>,
    runs: AtomicU64,
}

impl FetchOrchestrator {
    pub fn new(collaborators: Collaborators, settings: PipelineSettings) -> Self {
        let Collaborators { location, permissions, network, weather, sink } = collaborators;

        Self {
            gate: PermissionGate::new(location.clone(), permissions),
            acquirer: LocationAcquirer::new(location, settings.location_timeout),
            network,
            weather,
            sink,
            settings,
            turn: Mutex::new(()),
            runs: AtomicU64::new(0),
        }
    }

    /// Wires the OpenWeather client and DNS reachability from config; the
    /// host supplies location, permissions and the display.
    pub fn from_config(
        config: &Config,
        location: Arc<dyn LocationCapability>,
        permissions: Arc<dyn PermissionCapability>,
        sink: Arc<dyn DisplaySink>,
    ) -> Result<Self> {
        let settings = PipelineSettings::from_config(config)?;
        let collaborators = Collaborators {
            location,
            permissions,
            network: Arc::new(DnsReachability::for_base_url(&config.api.base_url)?),
            weather: Arc::new(OpenWeatherClient::new(&config.api.base_url)?),
            sink,
        };

        Ok(Self::new(collaborators, settings))
    }

    /// Performs one run and reports its outcome to the display sink.
    pub async fn run(&self) -> RunReport {
        let _turn = self.turn.lock().await;
        let id = self.runs.fetch_add(1, Ordering::Relaxed) + 1;

        let span = tracing::info_span!("run", run = id);
        async move {
            let mut ctx = RunContext::new(id);
            let result = self.drive(&mut ctx).await;

            match &result {
                Ok(model) => self.sink.render_weather(model),
                Err(err) => self.sink.render_error(err),
            }

            ctx.finish(result)
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, ctx: &mut RunContext) -> Result<DisplayModel, FetchError> {
        ctx.enter(RunState::CheckingService);
        if !self.gate.check_location_service_enabled() {
            self.sink.offer_settings(SettingsTarget::LocationSource);
            return Err(FetchError::LocationServiceDisabled);
        }

        ctx.enter(RunState::AwaitingPermission);
        match self.gate.request_permissions(&LOCATION_SCOPES).await {
            PermissionOutcome::Granted => {}
            PermissionOutcome::Denied => return Err(FetchError::PermissionDenied),
            PermissionOutcome::PermanentlyDenied => {
                self.sink.offer_settings(SettingsTarget::AppPermissions);
                return Err(FetchError::PermissionPermanentlyDenied);
            }
        }

        ctx.enter(RunState::AcquiringLocation);
        let coords = self.acquirer.acquire_once().await?;

        ctx.enter(RunState::FetchingWeather);
        self.sink.show_progress();
        let fetched = self.fetch_weather(coords).await;
        self.sink.hide_progress();

        Ok(self.project(fetched?))
    }

    async fn fetch_weather(&self, coords: Coordinates) -> Result<WeatherObservation, FetchError> {
        if !self.network.is_network_available().await {
            return Err(FetchError::NoNetwork);
        }

        self.weather.fetch(coords, self.settings.units, &self.settings.api_key).await
    }

    fn project(&self, observation: WeatherObservation) -> DisplayModel {
        let unit = units::unit_for(&self.settings.locale);
        let sunrise = time_format::format_local(observation.sunrise_unix);
        let sunset = time_format::format_local(observation.sunset_unix);

        DisplayModel::project(observation, unit, sunrise, sunset)
    }
}

//! Stub collaborators shared by the unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::{
    display::{DisplaySink, SettingsTarget},
    error::FetchError,
    location::{FixListener, LocationCapability, LocationRequest, LocationSubscription},
    model::{Coordinates, DisplayModel, UnitSystem, WeatherObservation},
    network::NetworkCapability,
    permission::{PermissionCapability, PermissionOutcome, PermissionResponder, PermissionScope},
    provider::WeatherProvider,
};

pub fn observation() -> WeatherObservation {
    WeatherObservation {
        condition_main: "Clouds".into(),
        condition_description: "broken clouds".into(),
        temp_current: 14.5,
        temp_min: 12.1,
        temp_max: 16.8,
        humidity_percent: 81,
        wind_speed: 4.12,
        sunrise_unix: 1_699_972_740,
        sunset_unix: 1_700_010_720,
        location_name: "San Francisco".into(),
        country_code: "US".into(),
    }
}

#[derive(Debug)]
pub struct StubLocation {
    enabled: AtomicBool,
    fix: Option<Coordinates>,
    listener: Mutex<Option<FixListener>>,
    subscriptions: AtomicUsize,
    cancellations: Arc<AtomicUsize>,
}

impl StubLocation {
    /// Enabled, but never produces a fix.
    pub fn silent() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            fix: None,
            listener: Mutex::new(None),
            subscriptions: AtomicUsize::new(0),
            cancellations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Delivers `coords` as soon as updates are requested.
    pub fn delivering(coords: Coordinates) -> Self {
        Self { fix: Some(coords), ..Self::silent() }
    }

    pub fn set_service_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }

    /// Pushes an update through the most recent listener.
    pub fn deliver_late(&self, coords: Coordinates) -> bool {
        self.listener.lock().as_ref().is_some_and(|l| l.deliver(coords))
    }
}

#[derive(Debug)]
struct StubSubscription {
    cancellations: Arc<AtomicUsize>,
    cancelled: bool,
}

impl LocationSubscription for StubSubscription {
    fn cancel(&mut self) {
        if !self.cancelled {
            self.cancelled = true;
            self.cancellations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl LocationCapability for StubLocation {
    fn is_service_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn request_updates(
        &self,
        _request: &LocationRequest,
        listener: FixListener,
    ) -> Box<dyn LocationSubscription> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        if let Some(coords) = self.fix {
            listener.deliver(coords);
        }
        *self.listener.lock() = Some(listener);

        Box::new(StubSubscription { cancellations: self.cancellations.clone(), cancelled: false })
    }
}

#[derive(Debug)]
pub struct StubPermissions {
    granted: bool,
    answer: Option<PermissionOutcome>,
    rationale: bool,
    checks: AtomicUsize,
    requests: AtomicUsize,
    rationales: AtomicUsize,
}

impl StubPermissions {
    fn with(granted: bool, answer: Option<PermissionOutcome>) -> Self {
        Self {
            granted,
            answer,
            rationale: false,
            checks: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
            rationales: AtomicUsize::new(0),
        }
    }

    pub fn already_granted() -> Self {
        Self::with(true, None)
    }

    pub fn answering(outcome: PermissionOutcome) -> Self {
        Self::with(false, Some(outcome))
    }

    /// Drops the responder without answering.
    pub fn never_answering() -> Self {
        Self::with(false, None)
    }

    pub fn with_rationale(mut self) -> Self {
        self.rationale = true;
        self
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn rationales(&self) -> usize {
        self.rationales.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionCapability for StubPermissions {
    fn are_granted(&self, _scopes: &[PermissionScope]) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.granted
    }

    fn request(&self, _scopes: &[PermissionScope], responder: PermissionResponder) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(outcome) = self.answer {
            tokio::spawn(async move { responder.resolve(outcome) });
        }
    }

    fn should_show_rationale(&self, _scopes: &[PermissionScope]) -> bool {
        self.rationale
    }

    async fn show_rationale(&self, _scopes: &[PermissionScope]) {
        self.rationales.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct StubNetwork {
    available: bool,
}

impl StubNetwork {
    pub fn online() -> Self {
        Self { available: true }
    }

    pub fn offline() -> Self {
        Self { available: false }
    }
}

#[async_trait]
impl NetworkCapability for StubNetwork {
    async fn is_network_available(&self) -> bool {
        self.available
    }
}

#[derive(Debug)]
pub struct StubWeather {
    response: Result<WeatherObservation, FetchError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    last_coords: Mutex<Option<Coordinates>>,
}

impl StubWeather {
    pub fn returning(response: Result<WeatherObservation, FetchError>) -> Self {
        Self {
            response,
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            last_coords: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn last_coords(&self) -> Option<Coordinates> {
        *self.last_coords.lock()
    }
}

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn fetch(
        &self,
        coords: Coordinates,
        _units: UnitSystem,
        _api_key: &str,
    ) -> Result<WeatherObservation, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_coords.lock() = Some(coords);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.response.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    ShowProgress,
    HideProgress,
    Weather(DisplayModel),
    Error(FetchError),
    Settings(SettingsTarget),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&SinkEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }
}

impl DisplaySink for RecordingSink {
    fn show_progress(&self) {
        self.events.lock().push(SinkEvent::ShowProgress);
    }

    fn hide_progress(&self) {
        self.events.lock().push(SinkEvent::HideProgress);
    }

    fn render_weather(&self, model: &DisplayModel) {
        self.events.lock().push(SinkEvent::Weather(model.clone()));
    }

    fn render_error(&self, error: &FetchError) {
        self.events.lock().push(SinkEvent::Error(error.clone()));
    }

    fn offer_settings(&self, target: SettingsTarget) {
        self.events.lock().push(SinkEvent::Settings(target));
    }
}

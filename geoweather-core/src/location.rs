//! Single-shot location fixes.

use parking_lot::Mutex;
use std::{fmt::Debug, sync::Arc, time::Duration};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::{error::FetchError, model::Coordinates};

/// Update interval hint passed to the platform.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationPriority {
    HighAccuracy,
    Balanced,
    LowPower,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationRequest {
    pub priority: LocationPriority,
    pub interval: Duration,
    pub max_updates: u32,
    /// How long to wait for the fix before giving up.
    pub timeout: Duration,
}

impl LocationRequest {
    pub fn single_high_accuracy(timeout: Duration) -> Self {
        Self {
            priority: LocationPriority::HighAccuracy,
            interval: DEFAULT_INTERVAL,
            max_updates: 1,
            timeout,
        }
    }
}

/// Receives location updates on behalf of one acquisition.
///
/// Only the first delivery is accepted. Once the acquisition has its fix,
/// timed out, or was dropped, every delivery is rejected.
#[derive(Debug, Clone)]
pub struct FixListener {
    slot: Arc<Mutex<Option<oneshot::Sender<Coordinates>>>>,
}

impl FixListener {
    pub fn channel() -> (Self, oneshot::Receiver<Coordinates>) {
        let (tx, rx) = oneshot::channel();
        (Self { slot: Arc::new(Mutex::new(Some(tx))) }, rx)
    }

    /// Returns `true` if the fix was accepted.
    pub fn deliver(&self, coords: Coordinates) -> bool {
        match self.slot.lock().take() {
            Some(tx) => tx.send(coords).is_ok(),
            None => {
                tracing::debug!("location update after listener was released, ignoring");
                false
            }
        }
    }

    pub fn close(&self) {
        self.slot.lock().take();
    }

    pub fn is_closed(&self) -> bool {
        self.slot.lock().as_ref().is_none_or(|tx| tx.is_closed())
    }
}

/// Handle to a live platform registration for location updates.
pub trait LocationSubscription: Send + Debug {
    fn cancel(&mut self);
}

/// Platform location API.
pub trait LocationCapability: Send + Sync + Debug {
    /// Whether any location provider is switched on.
    fn is_service_enabled(&self) -> bool;

    fn request_updates(
        &self,
        request: &LocationRequest,
        listener: FixListener,
    ) -> Box<dyn LocationSubscription>;
}

/// Owns a registration and tears it down exactly once, at the latest on drop.
#[derive(Debug)]
struct Registration {
    subscription: Option<Box<dyn LocationSubscription>>,
    listener: FixListener,
}

impl Registration {
    fn release(&mut self) {
        self.listener.close();
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
            tracing::debug!("location subscription released");
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Debug, Clone)]
pub struct LocationAcquirer {
    capability: Arc<dyn LocationCapability>,
    request: LocationRequest,
}

impl LocationAcquirer {
    pub fn new(capability: Arc<dyn LocationCapability>, timeout: Duration) -> Self {
        Self { capability, request: LocationRequest::single_high_accuracy(timeout) }
    }

    pub fn request(&self) -> &LocationRequest {
        &self.request
    }

    /// Waits for one fix, bounded by the request timeout.
    ///
    /// The platform registration is cancelled before this returns, and also if
    /// the returned future is dropped early.
    pub async fn acquire_once(&self) -> Result<Coordinates, FetchError> {
        let (listener, fix) = FixListener::channel();
        let subscription = self.capability.request_updates(&self.request, listener.clone());
        let mut registration = Registration { subscription: Some(subscription), listener };

        let result = tokio::time::timeout(self.request.timeout, fix).await;
        registration.release();

        match result {
            Ok(Ok(coords)) => {
                tracing::info!(
                    latitude = coords.latitude,
                    longitude = coords.longitude,
                    "location fix obtained"
                );
                Ok(coords)
            }
            Ok(Err(_)) | Err(_) => {
                tracing::warn!(timeout = ?self.request.timeout, "no location fix within bound");
                Err(FetchError::LocationTimeout)
            }
        }
    }
}

/// Location source backed by configured coordinates.
///
/// The service counts as enabled only when coordinates are present. Each
/// subscription delivers the fix after the request interval.
#[derive(Debug, Clone)]
pub struct StaticLocationSource {
    coords: Option<Coordinates>,
}

impl StaticLocationSource {
    pub fn new(coords: Option<Coordinates>) -> Self {
        Self { coords }
    }
}

#[derive(Debug)]
struct TaskSubscription {
    task: Option<JoinHandle<()>>,
}

impl LocationSubscription for TaskSubscription {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl LocationCapability for StaticLocationSource {
    fn is_service_enabled(&self) -> bool {
        self.coords.is_some()
    }

    fn request_updates(
        &self,
        request: &LocationRequest,
        listener: FixListener,
    ) -> Box<dyn LocationSubscription> {
        let Some(coords) = self.coords else {
            return Box::new(TaskSubscription { task: None });
        };

        let interval = request.interval;
        let task = tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            listener.deliver(coords);
        });

        Box::new(TaskSubscription { task: Some(task) })
    }
}

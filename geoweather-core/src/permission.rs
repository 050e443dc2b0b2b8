//! Location-service and permission gating.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, sync::Arc};
use tokio::sync::oneshot;

use crate::location::LocationCapability;

/// Location access scopes the pipeline asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionScope {
    FineLocation,
    CoarseLocation,
}

pub const LOCATION_SCOPES: [PermissionScope; 2] =
    [PermissionScope::FineLocation, PermissionScope::CoarseLocation];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Granted,
    Denied,
    PermanentlyDenied,
}

/// Permission answer persisted between runs by hosts that remember it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredPermission {
    #[default]
    NotAsked,
    Granted,
    Denied,
    DeniedForever,
}

/// Single-use handle through which a permission capability reports its answer.
///
/// `resolve` consumes the responder, so an answer can be given at most once.
/// Dropping it unanswered is reported to the gate as a denial.
#[derive(Debug)]
pub struct PermissionResponder {
    tx: oneshot::Sender<PermissionOutcome>,
}

impl PermissionResponder {
    pub fn channel() -> (Self, oneshot::Receiver<PermissionOutcome>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn resolve(self, outcome: PermissionOutcome) {
        if let Err(outcome) = self.tx.send(outcome) {
            tracing::debug!(?outcome, "permission answer arrived after the run was abandoned");
        }
    }
}

/// Platform permission API.
#[async_trait]
pub trait PermissionCapability: Send + Sync + Debug {
    fn are_granted(&self, scopes: &[PermissionScope]) -> bool;

    /// Starts a request; the answer is delivered through `responder`, possibly later.
    fn request(&self, scopes: &[PermissionScope], responder: PermissionResponder);

    fn should_show_rationale(&self, _scopes: &[PermissionScope]) -> bool {
        false
    }

    /// Explains why the permission is needed before the request is made.
    async fn show_rationale(&self, _scopes: &[PermissionScope]) {}
}

#[derive(Debug, Clone)]
pub struct PermissionGate {
    location: Arc<dyn LocationCapability>,
    permissions: Arc<dyn PermissionCapability>,
}

impl PermissionGate {
    pub fn new(
        location: Arc<dyn LocationCapability>,
        permissions: Arc<dyn PermissionCapability>,
    ) -> Self {
        Self { location, permissions }
    }

    /// Queried fresh on every call; nothing is cached between runs.
    pub fn check_location_service_enabled(&self) -> bool {
        self.location.is_service_enabled()
    }

    /// Resolves to exactly one outcome per call.
    pub async fn request_permissions(&self, required: &[PermissionScope]) -> PermissionOutcome {
        if self.permissions.are_granted(required) {
            tracing::debug!("location permission already granted");
            return PermissionOutcome::Granted;
        }

        if self.permissions.should_show_rationale(required) {
            self.permissions.show_rationale(required).await;
        }

        let (responder, answer) = PermissionResponder::channel();
        self.permissions.request(required, responder);

        match answer.await {
            Ok(outcome) => {
                tracing::debug!(?outcome, "permission request answered");
                outcome
            }
            Err(_) => {
                tracing::warn!("permission request dropped without an answer, treating as denied");
                PermissionOutcome::Denied
            }
        }
    }
}

use reqwest::StatusCode;
use thiserror::Error;

/// Terminal outcome of a failed orchestration run.
///
/// Every stage converts its own failure into exactly one variant; none of them
/// are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("location service is disabled")]
    LocationServiceDisabled,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("location permission permanently denied")]
    PermissionPermanentlyDenied,

    #[error("no location fix within the allowed time")]
    LocationTimeout,

    #[error("no network connection")]
    NoNetwork,

    #[error("weather API rejected the request with status {0}")]
    HttpClientError(u16),

    #[error("weather API returned 404 not found")]
    HttpNotFound,

    #[error("weather API failed with status {0}")]
    HttpServerOrUnknown(u16),

    #[error("weather request failed: {0}")]
    TransportFailure(String),
}

impl FetchError {
    /// Maps a non-success HTTP status to its error variant.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => FetchError::HttpClientError(400),
            404 => FetchError::HttpNotFound,
            code => FetchError::HttpServerOrUnknown(code),
        }
    }

    /// Text shown to the user for this outcome.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::LocationServiceDisabled => {
                "Your location provider is turned off. Please turn it on.".to_string()
            }
            FetchError::PermissionDenied => {
                "Location permission was denied, so the weather for your position cannot be shown."
                    .to_string()
            }
            FetchError::PermissionPermanentlyDenied => {
                "You have permanently denied location permission. It can be re-enabled in settings."
                    .to_string()
            }
            FetchError::LocationTimeout => {
                "Could not determine your location in time. Please try again.".to_string()
            }
            FetchError::NoNetwork => "No internet connection.".to_string(),
            FetchError::HttpClientError(code) => {
                format!("The weather service rejected the request (error {code}).")
            }
            FetchError::HttpNotFound => {
                "The weather service has no data for this location.".to_string()
            }
            FetchError::HttpServerOrUnknown(code) => {
                format!("The weather service is unavailable right now (error {code}).")
            }
            FetchError::TransportFailure(msg) => {
                format!("Could not load the weather: {msg}")
            }
        }
    }

    /// Whether the UI should offer to open the app's permission settings.
    pub fn offers_settings(&self) -> bool {
        matches!(self, FetchError::PermissionPermanentlyDenied)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::TransportFailure(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::TransportFailure(format!("malformed weather payload: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_is_total() {
        assert_eq!(FetchError::from_status(StatusCode::BAD_REQUEST), FetchError::HttpClientError(400));
        assert_eq!(FetchError::from_status(StatusCode::NOT_FOUND), FetchError::HttpNotFound);
        assert_eq!(
            FetchError::from_status(StatusCode::UNAUTHORIZED),
            FetchError::HttpServerOrUnknown(401)
        );
        assert_eq!(
            FetchError::from_status(StatusCode::BAD_GATEWAY),
            FetchError::HttpServerOrUnknown(502)
        );
    }

    #[test]
    fn every_variant_has_a_distinct_message() {
        let all = [
            FetchError::LocationServiceDisabled,
            FetchError::PermissionDenied,
            FetchError::PermissionPermanentlyDenied,
            FetchError::LocationTimeout,
            FetchError::NoNetwork,
            FetchError::HttpClientError(400),
            FetchError::HttpNotFound,
            FetchError::HttpServerOrUnknown(500),
            FetchError::TransportFailure("boom".into()),
        ];

        let messages: std::collections::HashSet<String> =
            all.iter().map(FetchError::user_message).collect();
        assert_eq!(messages.len(), all.len());
    }

    #[test]
    fn only_permanent_denial_offers_settings() {
        assert!(FetchError::PermissionPermanentlyDenied.offers_settings());
        assert!(!FetchError::PermissionDenied.offers_settings());
        assert!(!FetchError::HttpNotFound.offers_settings());
    }
}

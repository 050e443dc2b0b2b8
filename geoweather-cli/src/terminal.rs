//! Terminal implementations of the host-side capabilities.

use async_trait::async_trait;
use geoweather_core::{
    Config, DisplayModel, DisplaySink, FetchError, PermissionCapability, PermissionOutcome,
    PermissionResponder, PermissionScope, SettingsTarget, StoredPermission,
};
use inquire::Select;
use parking_lot::Mutex;
use std::{
    io::Write,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

const ALLOW: &str = "Allow";
const DENY: &str = "Deny";
const DENY_FOREVER: &str = "Deny and don't ask again";

/// Asks for location access on the terminal and remembers the answer in the config file.
#[derive(Debug, Clone)]
pub struct PromptPermissions {
    stored: Arc<Mutex<StoredPermission>>,
}

impl PromptPermissions {
    pub fn new(stored: StoredPermission) -> Self {
        Self { stored: Arc::new(Mutex::new(stored)) }
    }

    fn stored(&self) -> StoredPermission {
        *self.stored.lock()
    }
}

/// Re-reads the config from disk so that command-line overrides are not persisted.
fn remember(answer: StoredPermission) {
    let saved = Config::load().and_then(|mut config| {
        config.permission.location = answer;
        config.save()
    });

    if let Err(err) = saved {
        tracing::warn!(error = %err, "could not persist permission answer");
    }
}

#[async_trait]
impl PermissionCapability for PromptPermissions {
    fn are_granted(&self, _scopes: &[PermissionScope]) -> bool {
        self.stored() == StoredPermission::Granted
    }

    fn request(&self, _scopes: &[PermissionScope], responder: PermissionResponder) {
        if self.stored() == StoredPermission::DeniedForever {
            responder.resolve(PermissionOutcome::PermanentlyDenied);
            return;
        }

        let stored_slot = self.stored.clone();
        tokio::task::spawn_blocking(move || {
            let answer = Select::new(
                "Allow weather to use your location?",
                vec![ALLOW, DENY, DENY_FOREVER],
            )
            .prompt();

            let (stored, outcome) = match answer {
                Ok(ALLOW) => (StoredPermission::Granted, PermissionOutcome::Granted),
                Ok(DENY_FOREVER) => {
                    (StoredPermission::DeniedForever, PermissionOutcome::PermanentlyDenied)
                }
                Ok(_) => (StoredPermission::Denied, PermissionOutcome::Denied),
                Err(err) => {
                    // The gate reports a dropped responder as a denial.
                    tracing::warn!(error = %err, "location permission prompt failed");
                    return;
                }
            };

            *stored_slot.lock() = stored;
            remember(stored);
            responder.resolve(outcome);
        });
    }

    fn should_show_rationale(&self, _scopes: &[PermissionScope]) -> bool {
        self.stored() == StoredPermission::Denied
    }

    async fn show_rationale(&self, _scopes: &[PermissionScope]) {
        println!(
            "Weather for your position needs your location. \
             Without it no forecast can be shown."
        );
    }
}

/// Prints results to stdout and progress to stderr.
#[derive(Debug, Default)]
pub struct TerminalSink {
    progress_visible: AtomicBool,
}

impl DisplaySink for TerminalSink {
    fn show_progress(&self) {
        if !self.progress_visible.swap(true, Ordering::SeqCst) {
            eprint!("Fetching weather...");
            let _ = std::io::stderr().flush();
        }
    }

    fn hide_progress(&self) {
        if self.progress_visible.swap(false, Ordering::SeqCst) {
            eprint!("\r\x1b[2K");
            let _ = std::io::stderr().flush();
        }
    }

    fn render_weather(&self, model: &DisplayModel) {
        println!("{}", format_model(model));
    }

    fn render_error(&self, error: &FetchError) {
        eprintln!("{}", error.user_message());
    }

    fn offer_settings(&self, target: SettingsTarget) {
        match target {
            SettingsTarget::LocationSource => eprintln!(
                "Hint: set a location with `weather configure` or pass --lat and --lon."
            ),
            SettingsTarget::AppPermissions => eprintln!(
                "Hint: run `weather permissions reset` to be asked for location access again."
            ),
        }
    }
}

fn format_model(model: &DisplayModel) -> String {
    let place = if model.country_code.is_empty() {
        model.location_name.clone()
    } else {
        format!("{}, {}", model.location_name, model.country_code)
    };

    [
        place,
        format!("{} ({})", model.condition, model.description),
        format!("Temperature: {}  ({} / {})", model.temperature, model.temp_min, model.temp_max),
        format!("Humidity:    {}", model.humidity),
        format!("Wind:        {}", model.wind_speed),
        format!("Sunrise:     {}", model.sunrise),
        format!("Sunset:      {}", model.sunset),
    ]
    .join("\n")
}

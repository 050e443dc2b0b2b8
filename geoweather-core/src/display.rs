use std::fmt::Debug;

use crate::{error::FetchError, model::DisplayModel};

/// Settings screens the UI may offer to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsTarget {
    /// System switch for location providers.
    LocationSource,
    /// This app's permission settings.
    AppPermissions,
}

/// Where the pipeline's results and progress go. Rendering is up to the host.
pub trait DisplaySink: Send + Sync + Debug {
    fn show_progress(&self);
    fn hide_progress(&self);
    fn render_weather(&self, model: &DisplayModel);
    fn render_error(&self, error: &FetchError);
    fn offer_settings(&self, target: SettingsTarget);
}

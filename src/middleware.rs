//! Per-request theme selection.
//!
//! The framework-facing hook: before rendering, the host calls
//! [`ThemeSelector::handle`] with the theme name extracted from the route (if
//! any). Selection falls back to the configured theme and degrades gracefully;
//! an unknown theme must not fail the request.

use tracing::warn;

use crate::config::Config;
use crate::registry::ThemesManager;

/// Chooses the active theme for one request.
#[derive(Debug, Clone, Default)]
pub struct ThemeSelector {
    fallback: Option<String>,
}

impl ThemeSelector {
    pub fn new(fallback: Option<String>) -> Self {
        Self { fallback }
    }

    /// Selector using the configured `fallback_theme`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.fallback_theme.clone())
    }

    /// Apply the selection: the requested theme if given, else the fallback,
    /// else leave the manager untouched. Failures are logged, never raised.
    ///
    /// Returns the qualified name of the theme that ended up active, if the
    /// selection changed anything.
    pub fn handle(&self, manager: &mut ThemesManager, requested: Option<&str>) -> Option<String> {
        let name = requested.or(self.fallback.as_deref())?.to_string();

        match manager.set(&name) {
            Ok(()) => manager.current().map(|theme| theme.qualified_name()),
            Err(err) => {
                warn!(theme = %name, error = %err, "request theme selection failed");
                None
            }
        }
    }
}

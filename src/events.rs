//! Activation lifecycle notifications.
//!
//! The registry fires a pair of events around every actual state change:
//! `Enabling`/`Enabled` and `Disabling`/`Disabled`. Hosts subscribe with a
//! plain callback; there is no global event bus.

/// A theme lifecycle notification, carrying the qualified `vendor/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeEvent {
    /// Fired just before a theme becomes the active one.
    Enabling(String),
    /// Fired once a theme is active and its paths are registered.
    Enabled(String),
    /// Fired just before the active theme is switched off.
    Disabling(String),
    /// Fired once a theme is inactive.
    Disabled(String),
}

impl ThemeEvent {
    /// Qualified name of the theme the event concerns.
    pub fn theme(&self) -> &str {
        match self {
            ThemeEvent::Enabling(name)
            | ThemeEvent::Enabled(name)
            | ThemeEvent::Disabling(name)
            | ThemeEvent::Disabled(name) => name,
        }
    }
}

/// A subscriber callback. Called synchronously, in subscription order.
pub type Observer = Box<dyn Fn(&ThemeEvent) + Send + Sync>;

/// Ordered list of subscribers.
#[derive(Default)]
pub struct Observers {
    subscribers: Vec<Observer>,
}

impl Observers {
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: Fn(&ThemeEvent) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    pub fn notify(&self, event: &ThemeEvent) {
        for subscriber in &self.subscribers {
            subscriber(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

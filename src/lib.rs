//! Theme discovery, activation and asset cascading for server-side web
//! applications.
//!
//! A theme is a self-contained package of views, assets and translations that
//! can be swapped at runtime. Themes live under a root directory, one
//! `theme.json` manifest per package, and may extend a parent theme: missing
//! assets cascade up the parent chain and finally to the application public
//! directory, in the same spirit as CSS and template cascading.
//!
//! # Example
//!
//! ```no_run
//! use themely::{Config, ThemesManager};
//!
//! let config = Config::load_default()?;
//! let mut manager = ThemesManager::new(config)?;
//!
//! manager.set("acme/dark")?;
//!
//! // Missing files fall through to the parent theme, then to the
//! // application public directory.
//! let logo = manager.url("images/logo.png", true);
//! let views = manager.view_paths("acme/dark")?;
//! # Ok::<(), themely::Error>(())
//! ```

mod assets;
pub mod cache;
pub mod config;
pub mod error;
pub mod events;
mod finder;
pub mod html;
pub mod manifest;
pub mod middleware;
mod registry;
pub mod scaffold;
mod theme;

pub use cache::{CacheStore, FileCache};
pub use config::{CacheConfig, Config};
pub use error::{Error, Result};
pub use events::ThemeEvent;
pub use finder::ThemeFinder;
pub use manifest::Manifest;
pub use middleware::ThemeSelector;
pub use registry::ThemesManager;
pub use theme::Theme;

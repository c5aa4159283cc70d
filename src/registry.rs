//! The theme registry.
//!
//! `ThemesManager` owns the collection of discovered themes, keyed by
//! qualified `vendor/name`, and tracks the single enabled one. It is a plain
//! value the host application holds and passes around; there is no global
//! state. All operations are synchronous and request-scoped.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::assets;
use crate::cache::{CacheStore, FileCache};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::{Observers, ThemeEvent};
use crate::finder::{find_key, ThemeFinder};
use crate::html;
use crate::theme::Theme;

/// Owns the theme collection and the activation state.
pub struct ThemesManager {
    config: Config,
    themes: BTreeMap<String, Theme>,
    observers: Observers,
    cache: Option<Box<dyn CacheStore>>,
}

impl ThemesManager {
    /// Build a manager for the given configuration.
    ///
    /// When caching is enabled the file-backed store under the user cache
    /// directory is used; construction hydrates from it, scanning and filling
    /// it on a miss.
    pub fn new(config: Config) -> Result<Self> {
        let cache: Option<Box<dyn CacheStore>> = if config.cache.enabled {
            Some(Box::new(FileCache::default_location()))
        } else {
            None
        };
        Self::with_store(config, cache)
    }

    /// Build a manager backed by a caller-provided cache store.
    pub fn with_cache(config: Config, cache: Box<dyn CacheStore>) -> Result<Self> {
        Self::with_store(config, Some(cache))
    }

    fn with_store(config: Config, cache: Option<Box<dyn CacheStore>>) -> Result<Self> {
        let mut manager = Self {
            config,
            themes: BTreeMap::new(),
            observers: Observers::default(),
            cache,
        };
        manager.load()?;
        Ok(manager)
    }

    /// Populate the collection: from the cache when enabled and live,
    /// otherwise by scanning the themes directory.
    fn load(&mut self) -> Result<()> {
        if self.config.cache.enabled {
            if let Some(cache) = self.cache.as_deref() {
                if let Some(payload) = cache.get(&self.config.cache.key) {
                    match serde_json::from_str(&payload) {
                        Ok(themes) => {
                            self.themes = themes;
                            debug!(count = self.themes.len(), "themes hydrated from cache");
                            return Ok(());
                        }
                        Err(err) => {
                            warn!(error = %err, "stale themes cache, rescanning");
                            let _ = cache.forget(&self.config.cache.key);
                        }
                    }
                }

                self.themes = ThemeFinder::find(&self.config.directory)?;
                self.store_cache()?;
                return Ok(());
            }
        }

        self.themes = ThemeFinder::find(&self.config.directory)?;
        Ok(())
    }

    /// Drop the current collection and rescan the themes directory.
    /// Enabled state is not carried over.
    pub fn rescan(&mut self) -> Result<()> {
        self.themes = ThemeFinder::find(&self.config.directory)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// All discovered themes, in key order.
    pub fn all(&self) -> impl Iterator<Item = &Theme> {
        self.themes.values()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Find a theme by name and optional vendor.
    ///
    /// A `vendor/name` qualified name overrides the `vendor` argument; a bare
    /// name matches the first theme answering to it, case-insensitively.
    pub fn find_by_name(&self, name: &str, vendor: Option<&str>) -> Option<&Theme> {
        let qualified = match vendor {
            Some(vendor) if !name.contains('/') => format!("{vendor}/{name}"),
            _ => name.to_string(),
        };
        find_key(&self.themes, &qualified).and_then(|key| self.themes.get(&key))
    }

    /// Shorthand for [`find_by_name`](Self::find_by_name) without a vendor.
    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.find_by_name(name, None)
    }

    /// Whether any discovered theme answers to `name`.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The single enabled theme, if any.
    pub fn current(&self) -> Option<&Theme> {
        self.themes.values().find(|theme| theme.enabled())
    }

    fn current_key(&self) -> Option<String> {
        self.current().map(Theme::qualified_name)
    }

    fn key_of(&self, name: &str) -> Result<String> {
        find_key(&self.themes, name).ok_or_else(|| Error::ThemeNotFound(name.to_string()))
    }

    /// Make `name` the active theme, disabling the previously active one.
    ///
    /// Enabling and disabling are sequenced explicitly, not transactional;
    /// fine under the single-threaded request model this library assumes.
    pub fn set(&mut self, name: &str) -> Result<()> {
        let target = self.key_of(name)?;

        if let Some(current) = self.current_key() {
            if current != target {
                self.disable_key(&current, true)?;
            }
        }

        self.enable_key(&target, true)
    }

    /// Enable a theme, firing `Enabling`/`Enabled`. No-op if already enabled.
    pub fn enable(&mut self, name: &str) -> Result<()> {
        let key = self.key_of(name)?;
        self.enable_key(&key, true)
    }

    /// Enable without notifying observers.
    pub fn enable_silently(&mut self, name: &str) -> Result<()> {
        let key = self.key_of(name)?;
        self.enable_key(&key, false)
    }

    /// Disable a theme, firing `Disabling`/`Disabled`. No-op if already
    /// disabled.
    pub fn disable(&mut self, name: &str) -> Result<()> {
        let key = self.key_of(name)?;
        self.disable_key(&key, true)
    }

    /// Disable without notifying observers.
    pub fn disable_silently(&mut self, name: &str) -> Result<()> {
        let key = self.key_of(name)?;
        self.disable_key(&key, false)
    }

    fn enable_key(&mut self, key: &str, notify: bool) -> Result<()> {
        let enabled = self
            .themes
            .get(key)
            .map(Theme::enabled)
            .ok_or_else(|| Error::ThemeNotFound(key.to_string()))?;
        if enabled {
            return Ok(());
        }

        if notify {
            self.observers.notify(&ThemeEvent::Enabling(key.to_string()));
        }

        self.link_assets(key)?;
        if let Some(theme) = self.themes.get_mut(key) {
            theme.set_enabled(true);
        }
        info!(theme = key, "theme enabled");

        if notify {
            self.observers.notify(&ThemeEvent::Enabled(key.to_string()));
        }
        Ok(())
    }

    fn disable_key(&mut self, key: &str, notify: bool) -> Result<()> {
        let enabled = self
            .themes
            .get(key)
            .map(Theme::enabled)
            .ok_or_else(|| Error::ThemeNotFound(key.to_string()))?;
        if !enabled {
            return Ok(());
        }

        if notify {
            self.observers
                .notify(&ThemeEvent::Disabling(key.to_string()));
        }

        if let Some(theme) = self.themes.get_mut(key) {
            theme.set_enabled(false);
        }
        info!(theme = key, "theme disabled");

        if notify {
            self.observers.notify(&ThemeEvent::Disabled(key.to_string()));
        }
        Ok(())
    }

    /// Subscribe to activation lifecycle events.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: Fn(&ThemeEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback);
    }

    /// The theme with its parent chain, child first. Stops at unknown links
    /// and refuses to loop.
    fn chain(&self, key: &str) -> Vec<&Theme> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();

        let mut current = self.themes.get(key);
        while let Some(theme) = current {
            if !visited.insert(theme.qualified_name()) {
                break;
            }
            chain.push(theme);
            current = theme.parent().and_then(|parent| self.themes.get(parent));
        }

        chain
    }

    /// View search directories for a theme, child first.
    ///
    /// Hosts that prepend paths one at a time should iterate in reverse so
    /// the child theme ends up with the highest precedence.
    pub fn view_paths(&self, name: &str) -> Result<Vec<PathBuf>> {
        let key = self.key_of(name)?;
        let mut paths = Vec::new();
        for theme in self.chain(&key) {
            let views = theme.views_path();
            if !paths.contains(&views) {
                paths.push(views);
            }
        }
        Ok(paths)
    }

    /// Translation directories for a theme, parent first, existing
    /// directories only.
    pub fn translation_paths(&self, name: &str) -> Result<Vec<PathBuf>> {
        let key = self.key_of(name)?;
        let mut paths = Vec::new();
        for theme in self.chain(&key) {
            let translations = theme.translations_path();
            if translations.exists() && !paths.contains(&translations) {
                paths.push(translations);
            }
        }
        paths.reverse();
        Ok(paths)
    }

    /// Layout names available to a theme: file stems under every `layouts/`
    /// view subdirectory across the parent chain.
    pub fn layouts(&self, name: &str) -> Result<Vec<String>> {
        let mut layouts = Vec::new();
        for views in self.view_paths(name)? {
            let dir = views.join("layouts");
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    if !layouts.iter().any(|known| known == stem) {
                        layouts.push(stem.to_string());
                    }
                }
            }
        }
        Ok(layouts)
    }

    /// Resolve an asset URL against the current theme.
    ///
    /// A `vendor/name::path` reference resolves against that theme instead.
    /// With no current theme the path is returned rooted at `/`.
    pub fn url(&self, asset: &str, absolute: bool) -> String {
        if let Some((theme_name, path)) = asset.split_once("::") {
            if let Some(theme) = self.get(theme_name) {
                return assets::resolve_url(&self.config, &self.themes, theme, path, absolute);
            }
            warn!(theme = theme_name, asset = path, "asset reference to unknown theme");
            return format!("/{}", path.trim_start_matches('/'));
        }

        match self.current() {
            Some(theme) => assets::resolve_url(&self.config, &self.themes, theme, asset, absolute),
            None => format!("/{}", asset.trim_start_matches('/')),
        }
    }

    /// Alias of [`url`](Self::url), matching the template-facing helper name.
    pub fn asset(&self, asset: &str, absolute: bool) -> String {
        self.url(asset, absolute)
    }

    /// `<link>` tag for a stylesheet asset of the current theme.
    pub fn style(&self, asset: &str, absolute: bool) -> String {
        html::style_tag(&self.url(asset, absolute))
    }

    /// `<script>` tag for a script asset of the current theme.
    pub fn script(&self, asset: &str, mode: &str, absolute: bool) -> String {
        html::script_tag(&self.url(asset, absolute), mode, "text/javascript", "functionality")
    }

    /// `<img>` tag for an image asset of the current theme.
    pub fn image(&self, asset: &str, alt: &str, class: &str, absolute: bool) -> String {
        html::image_tag(&self.url(asset, absolute), alt, class, &[])
    }

    /// Formatted page title using the configured application name.
    pub fn page_title(&self, title: &str, with_app_name: bool, separator: &str) -> String {
        html::page_title(&self.config.app_name, title, with_app_name, separator, false)
    }

    /// Ensure public asset links exist for a theme and its whole parent
    /// chain, so cascaded assets are actually reachable under the web root.
    fn link_assets(&self, key: &str) -> Result<()> {
        for theme in self.chain(key) {
            let source = theme.public_source_path();
            if !source.exists() {
                continue;
            }

            // A remote asset root is not something we can link to.
            let assets_root = theme.assets_root(&self.config.symlink_path);
            if assets::is_absolute_url(&assets_root) {
                continue;
            }

            let target = self.config.public_dir.join(&assets_root);
            if target.exists() {
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }

            let source = fs::canonicalize(&source)?;
            if self.config.symlink_relative {
                let base = match target.parent() {
                    Some(parent) => fs::canonicalize(parent)?,
                    None => PathBuf::from("."),
                };
                symlink_dir(&relative_path(&base, &source), &target)?;
            } else {
                symlink_dir(&source, &target)?;
            }
            debug!(theme = %theme.qualified_name(), target = %target.display(), "linked theme assets");
        }
        Ok(())
    }

    /// Rescan and persist the collection into the cache store.
    pub fn build_cache(&mut self) -> Result<()> {
        if !self.config.cache.enabled || self.cache.is_none() {
            return Err(Error::CacheDisabled);
        }

        self.rescan()?;
        self.store_cache()
    }

    fn store_cache(&self) -> Result<()> {
        let Some(cache) = self.cache.as_deref() else {
            return Err(Error::CacheDisabled);
        };
        let payload = serde_json::to_string(&self.themes)?;
        cache.put(
            &self.config.cache.key,
            &payload,
            Duration::from_secs(self.config.cache.lifetime),
        )
    }

    /// Invalidate the cached collection. Succeeds quietly when caching is
    /// disabled.
    pub fn clear_cache(&self) -> Result<()> {
        match self.cache.as_deref() {
            Some(cache) if self.config.cache.enabled => cache.forget(&self.config.cache.key),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for ThemesManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemesManager")
            .field("themes", &self.themes.keys().collect::<Vec<_>>())
            .field("current", &self.current_key())
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

fn symlink_dir(source: &Path, target: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(source, target)
    }
    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_dir(source, target)
    }
}

/// Relative path from `base` to `path`. Both must be absolute.
fn relative_path(base: &Path, path: &Path) -> PathBuf {
    let base_components: Vec<Component<'_>> = base.components().collect();
    let path_components: Vec<Component<'_>> = path.components().collect();

    let common = base_components
        .iter()
        .zip(path_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push("..");
    }
    for component in &path_components[common..] {
        relative.push(component.as_os_str());
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/srv/app/public/themes"), Path::new("/srv/app/themes/acme/dark/public")),
            PathBuf::from("../../themes/acme/dark/public")
        );
        assert_eq!(
            relative_path(Path::new("/a/b"), Path::new("/a/b/c")),
            PathBuf::from("c")
        );
    }
}

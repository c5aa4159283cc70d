//! The theme entity.
//!
//! A `Theme` is one discovered package: identity from its manifest, a
//! directory on disk, an optional parent link (stored as a qualified name and
//! resolved by the registry) and a runtime-only enabled flag.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Strip the `theme-`/`-theme` affixes and noise from a declared name.
///
/// `"acme/dark-theme"` and `"acme/theme-dark"` both normalize to a `dark`
/// theme under the `acme` vendor, mirroring what theme authors actually name
/// their packages.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().replace("-theme", "").replace("theme-", "")
}

/// One discovered theme package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    name: String,
    vendor: String,
    version: String,
    description: String,
    path: PathBuf,
    /// Qualified `vendor/name` of the parent, if any. Resolved against the
    /// registry after all themes are loaded.
    parent: Option<String>,
    screenshot: String,
    /// Free-form `extra.theme` metadata from the manifest.
    extra: Map<String, Value>,
    /// Never persisted: re-scans and cache hydration start with no theme
    /// enabled.
    #[serde(skip)]
    enabled: bool,
}

impl Theme {
    /// Build a theme from a declared (possibly `vendor/name`) name and its
    /// directory.
    pub fn new(declared_name: &str, path: PathBuf) -> Self {
        let normalized = normalize_name(declared_name);
        let (vendor, name) = match normalized.split_once('/') {
            Some((vendor, name)) => (vendor.to_string(), name.to_string()),
            None => (String::new(), normalized),
        };

        Self {
            name,
            vendor,
            version: "0.1".to_string(),
            description: String::new(),
            path,
            parent: None,
            screenshot: String::new(),
            extra: Map::new(),
            enabled: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Lowercased `vendor/name`, the registry key.
    pub fn qualified_name(&self) -> String {
        if self.vendor.is_empty() {
            self.name.to_lowercase()
        } else {
            format!(
                "{}/{}",
                self.vendor.to_lowercase(),
                self.name.to_lowercase()
            )
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn screenshot(&self) -> &str {
        &self.screenshot
    }

    pub fn set_screenshot(&mut self, screenshot: impl Into<String>) {
        self.screenshot = screenshot.into();
    }

    /// The theme directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A path inside the theme directory.
    pub fn subpath(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// The theme's view search directory.
    pub fn views_path(&self) -> PathBuf {
        self.path.join("resources").join("views")
    }

    /// The theme's translation directory: `lang/` when present, otherwise the
    /// legacy `resources/lang/` location.
    pub fn translations_path(&self) -> PathBuf {
        let lang = self.path.join("lang");
        if lang.exists() {
            lang
        } else {
            self.path.join("resources").join("lang")
        }
    }

    /// The theme's on-disk public asset source directory.
    pub fn public_source_path(&self) -> PathBuf {
        self.path.join("public")
    }

    /// The public path (relative to the web root, or a remote URL) under
    /// which this theme's assets are served: `<symlink_path>/<vendor>/<name>`.
    pub fn assets_root(&self, symlink_path: &str) -> String {
        let root = symlink_path.trim_end_matches('/');
        if self.vendor.is_empty() {
            format!("{}/{}", root, self.name.to_lowercase())
        } else {
            format!(
                "{}/{}/{}",
                root,
                self.vendor.to_lowercase(),
                self.name.to_lowercase()
            )
        }
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Qualified name of the parent theme, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<String>) {
        self.parent = parent.filter(|name| !name.is_empty());
    }

    /// The manifest's `extra.theme` metadata.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub(crate) fn set_extra(&mut self, extra: Map<String, Value>) {
        self.extra = extra;
    }

    /// A string value from the extra metadata.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn disabled(&self) -> bool {
        !self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Case-insensitive match against a bare name and optional vendor.
    pub(crate) fn matches(&self, name: &str, vendor: Option<&str>) -> bool {
        let name_matches = self.name.eq_ignore_ascii_case(name);
        match vendor {
            Some(vendor) => name_matches && self.vendor.eq_ignore_ascii_case(vendor),
            None => name_matches,
        }
    }
}

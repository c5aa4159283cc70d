//! Asset URL resolution.
//!
//! Maps a logical asset path (`"css/app.css"`) to a servable URL by cascading
//! through the theme inheritance chain:
//!
//! 1. Absolute URLs pass through unmodified.
//! 2. A theme whose asset root is itself a remote URL short-circuits there
//!    (no parent fallback for CDN-hosted themes).
//! 3. `{key}` placeholders are substituted from the theme's extra metadata.
//! 4. A Vite `manifest.json` in the theme's public asset directory maps the
//!    logical path to its hashed build artifact.
//! 5. A literal file under the theme's public asset directory wins.
//! 6. Otherwise the parent theme is consulted with the same path.
//! 7. Otherwise the application public directory is the final fallback.
//! 8. Otherwise the miss is logged and the normalized path returned as-is.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::warn;
use url::Url;

use crate::config::Config;
use crate::theme::Theme;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"));

/// True for URLs that already carry an http(s) scheme.
pub(crate) fn is_absolute_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Replace `{key}` placeholders with values from the theme's extra metadata.
/// Unknown keys are left untouched.
pub(crate) fn substitute_placeholders<'a>(asset: &'a str, extra: &Map<String, Value>) -> Cow<'a, str> {
    PLACEHOLDER.replace_all(asset, |caps: &regex::Captures<'_>| {
        match extra.get(&caps[1]).and_then(Value::as_str) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Resolve an asset path against a theme and its parent chain.
///
/// `themes` is the full registry collection, used to follow parent links.
pub(crate) fn resolve_url(
    config: &Config,
    themes: &BTreeMap<String, Theme>,
    theme: &Theme,
    asset: &str,
    absolute: bool,
) -> String {
    let asset = asset.trim_matches('/');

    if is_absolute_url(asset) {
        return asset.to_string();
    }

    // CDN-hosted asset root: concatenate and stop, no parent fallback.
    let assets_root = theme.assets_root(&config.symlink_path);
    if is_absolute_url(&assets_root) {
        return format!("{assets_root}/{asset}");
    }

    let substituted = substitute_placeholders(asset, theme.extra());
    let assets_dir = config.public_dir.join(&assets_root);

    // Bundler manifest lookup (Vite)
    if let Some(built) = vite_lookup(&assets_dir.join("manifest.json"), &substituted) {
        let file = assets_dir.join(&built);
        return finish(config, &format!("{assets_root}/{built}"), &file, absolute);
    }

    // Literal file under the theme's public asset directory
    let candidate = assets_dir.join(substituted.as_ref());
    if candidate.is_file() {
        return finish(
            config,
            &format!("{assets_root}/{substituted}"),
            &candidate,
            absolute,
        );
    }

    // Walk up the inheritance chain
    if let Some(parent) = theme.parent().and_then(|key| themes.get(key)) {
        return resolve_url(config, themes, parent, &substituted, absolute);
    }

    // Application-wide public directory as the last real location
    let fallback = config.public_dir.join(substituted.as_ref());
    if fallback.is_file() {
        return finish(config, &substituted, &fallback, absolute);
    }

    warn!(asset = %substituted, theme = %theme.qualified_name(), "asset not found");
    substituted.replace('\\', "/")
}

/// Look a logical path up in a Vite manifest, returning the built file name.
fn vite_lookup(manifest_path: &Path, asset: &str) -> Option<String> {
    if !manifest_path.is_file() {
        return None;
    }

    let contents = fs::read_to_string(manifest_path).ok()?;
    let manifest: Value = match serde_json::from_str(&contents) {
        Ok(manifest) => manifest,
        Err(err) => {
            warn!(manifest = %manifest_path.display(), error = %err, "unreadable Vite manifest");
            return None;
        }
    };

    manifest
        .get(asset)?
        .get("file")?
        .as_str()
        .map(str::to_string)
}

/// Produce the final URL for a resolved file: base-url prefix when absolute,
/// plus an optional content-hash version token.
fn finish(config: &Config, public_path: &str, file: &Path, absolute: bool) -> String {
    let mut url = if absolute {
        match config.base_url.as_deref() {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), public_path),
            None => format!("/{public_path}"),
        }
    } else {
        public_path.to_string()
    };

    if config.version_assets {
        if let Some(token) = content_token(file) {
            url.push_str("?v=");
            url.push_str(&token);
        }
    }

    url
}

/// Short content hash used as a cache-busting token.
fn content_token(file: &Path) -> Option<String> {
    let contents = fs::read(file).ok()?;
    let digest = Sha256::digest(&contents);
    Some(digest[..4].iter().map(|byte| format!("{byte:02x}")).collect())
}

//! Theme discovery.
//!
//! `ThemeFinder` scans a root directory for `theme.json` manifests, at most
//! two directory levels deep (the conventional `<root>/<vendor>/<name>/`
//! layout, with single-level `<root>/<name>/` also accepted). Discovery is
//! best-effort: a malformed manifest is logged and skipped, while two
//! manifests claiming the same qualified name abort the scan.
//!
//! Loading is two-phase. All manifests are parsed first; parent links are
//! then resolved by name against the full set, so declaration order never
//! matters. Unknown parents are logged and cleared, cycles are rejected.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::theme::{normalize_name, Theme};

/// Directory names never descended into during a scan.
const EXCLUDED_DIRS: &[&str] = &["node_modules", "vendor"];

/// Maximum directory depth a manifest may sit at, relative to the root.
const MAX_DEPTH: usize = 2;

/// Scans a root directory and produces the theme collection.
pub struct ThemeFinder;

impl ThemeFinder {
    /// Discover all themes under `root`, keyed by qualified `vendor/name`.
    ///
    /// A missing root yields an empty collection, not an error: a fresh
    /// application simply has no themes yet.
    pub fn find(root: &Path) -> Result<BTreeMap<String, Theme>> {
        let mut themes = BTreeMap::new();

        if !root.exists() {
            debug!(root = %root.display(), "themes directory does not exist, skipping scan");
            return Ok(themes);
        }

        Self::scan_directory(root, 1, &mut themes)?;
        Self::resolve_parents(&mut themes)?;

        Ok(themes)
    }

    fn scan_directory(dir: &Path, depth: usize, themes: &mut BTreeMap<String, Theme>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "cannot read directory, skipping");
                return Ok(());
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let Some(dir_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if dir_name.starts_with('.') || EXCLUDED_DIRS.contains(&dir_name) {
                continue;
            }

            let manifest_path = path.join(MANIFEST_FILE);
            if manifest_path.is_file() {
                Self::load_theme(&manifest_path, themes)?;
            } else if depth < MAX_DEPTH {
                Self::scan_directory(&path, depth + 1, themes)?;
            }
        }

        Ok(())
    }

    /// Parse one manifest into a theme and insert it into the collection.
    ///
    /// Manifest parse failures and missing names are skipped with a warning;
    /// duplicate qualified names abort the scan.
    fn load_theme(manifest_path: &Path, themes: &mut BTreeMap<String, Theme>) -> Result<()> {
        let manifest = match Manifest::load(manifest_path) {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!(manifest = %manifest_path.display(), error = %err, "skipping theme");
                return Ok(());
            }
        };

        let Some(declared_name) = manifest.get_str("name") else {
            warn!(manifest = %manifest_path.display(), "manifest has no name, skipping theme");
            return Ok(());
        };

        let theme_dir = manifest_path
            .parent()
            .expect("manifest path always has a parent directory")
            .to_path_buf();

        let mut theme = Theme::new(declared_name, theme_dir);
        theme.set_version(manifest.get_str_or("version", "0.1"));
        theme.set_description(manifest.get_str_or("description", ""));
        theme.set_screenshot(manifest.get_str_or("extra.theme.screenshot", ""));
        theme.set_parent(
            manifest
                .get_str("extra.theme.parent")
                .map(|parent| normalize_name(parent).to_lowercase()),
        );
        if let Some(Value::Object(extra)) = manifest.get("extra.theme") {
            theme.set_extra(extra.clone());
        }

        let key = theme.qualified_name();
        if let Some(existing) = themes.get(&key) {
            return Err(Error::DuplicateTheme {
                name: key,
                first: existing.path().to_path_buf(),
                second: theme.path().to_path_buf(),
            });
        }

        debug!(theme = %key, path = %theme.path().display(), "discovered theme");
        themes.insert(key, theme);
        Ok(())
    }

    /// Resolve declared parent names to qualified registry keys and reject
    /// cycles.
    fn resolve_parents(themes: &mut BTreeMap<String, Theme>) -> Result<()> {
        // Phase one: replace each declared parent with the matching theme's
        // qualified name, or clear it when nothing matches.
        let mut resolved: Vec<(String, Option<String>)> = Vec::new();
        for (key, theme) in themes.iter() {
            let Some(declared) = theme.parent() else {
                continue;
            };

            let parent_key = find_key(themes, declared);
            if parent_key.is_none() {
                warn!(theme = %key, parent = declared, "parent theme not found, ignoring link");
            }
            resolved.push((key.clone(), parent_key));
        }
        for (key, parent_key) in resolved {
            if let Some(theme) = themes.get_mut(&key) {
                theme.set_parent(parent_key);
            }
        }

        // Phase two: walk every chain and reject loops.
        for (key, theme) in themes.iter() {
            let mut visited = HashSet::new();
            visited.insert(key.as_str());

            let mut current = theme;
            while let Some(parent_key) = current.parent() {
                if !visited.insert(parent_key) {
                    return Err(Error::ParentCycle(parent_key.to_string()));
                }
                match themes.get(parent_key) {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
        }

        Ok(())
    }
}

/// Find the registry key matching a (possibly unqualified) theme name.
pub(crate) fn find_key(themes: &BTreeMap<String, Theme>, name: &str) -> Option<String> {
    let normalized = normalize_name(name);
    let (vendor, bare) = match normalized.split_once('/') {
        Some((vendor, bare)) => (Some(vendor), bare),
        None => (None, normalized.as_str()),
    };

    themes
        .iter()
        .find(|(_, theme)| theme.matches(bare, vendor))
        .map(|(key, _)| key.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_theme(root: &Path, vendor: &str, name: &str, manifest: &str) -> PathBuf {
        let dir = root.join(vendor).join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        dir
    }

    #[test]
    fn test_missing_root_yields_empty_collection() {
        let themes = ThemeFinder::find(Path::new("/nonexistent/themes-root")).unwrap();
        assert!(themes.is_empty());
    }

    #[test]
    fn test_scan_discovers_vendor_name_layout() {
        let root = tempfile::tempdir().unwrap();
        write_theme(
            root.path(),
            "acme",
            "base",
            r#"{ "name": "acme/base", "version": "2.0.0", "description": "Base theme" }"#,
        );
        write_theme(root.path(), "acme", "dark", r#"{ "name": "acme/dark" }"#);

        let themes = ThemeFinder::find(root.path()).unwrap();
        assert_eq!(themes.len(), 2);

        let base = &themes["acme/base"];
        assert_eq!(base.version(), "2.0.0");
        assert_eq!(base.description(), "Base theme");
        assert!(base.disabled());

        // Defaults applied for the sparse manifest
        assert_eq!(themes["acme/dark"].version(), "0.1");
    }

    #[test]
    fn test_malformed_manifest_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        write_theme(root.path(), "acme", "base", r#"{ "name": "acme/base" }"#);
        write_theme(root.path(), "acme", "broken", "{ not json at all");

        let themes = ThemeFinder::find(root.path()).unwrap();
        assert_eq!(themes.len(), 1);
        assert!(themes.contains_key("acme/base"));
    }

    #[test]
    fn test_duplicate_qualified_name_aborts_scan() {
        let root = tempfile::tempdir().unwrap();
        write_theme(root.path(), "acme", "one", r#"{ "name": "acme/dark" }"#);
        write_theme(root.path(), "acme", "two", r#"{ "name": "acme/dark" }"#);

        match ThemeFinder::find(root.path()) {
            Err(Error::DuplicateTheme { name, .. }) => assert_eq!(name, "acme/dark"),
            other => panic!("expected DuplicateTheme, got {other:?}"),
        }
    }

    #[test]
    fn test_parent_resolution_is_order_independent() {
        let root = tempfile::tempdir().unwrap();
        // "dark" sorts before "base"'s vendor dir entry order is irrelevant:
        // parents resolve after the full scan.
        write_theme(
            root.path(),
            "acme",
            "dark",
            r#"{ "name": "acme/dark", "extra": { "theme": { "parent": "acme/base" } } }"#,
        );
        write_theme(root.path(), "acme", "base", r#"{ "name": "acme/base" }"#);

        let themes = ThemeFinder::find(root.path()).unwrap();
        assert_eq!(themes["acme/dark"].parent(), Some("acme/base"));
    }

    #[test]
    fn test_unknown_parent_is_cleared() {
        let root = tempfile::tempdir().unwrap();
        write_theme(
            root.path(),
            "acme",
            "dark",
            r#"{ "name": "acme/dark", "extra": { "theme": { "parent": "acme/ghost" } } }"#,
        );

        let themes = ThemeFinder::find(root.path()).unwrap();
        assert!(!themes["acme/dark"].has_parent());
    }

    #[test]
    fn test_parent_cycle_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        write_theme(
            root.path(),
            "acme",
            "a",
            r#"{ "name": "acme/a", "extra": { "theme": { "parent": "acme/b" } } }"#,
        );
        write_theme(
            root.path(),
            "acme",
            "b",
            r#"{ "name": "acme/b", "extra": { "theme": { "parent": "acme/a" } } }"#,
        );

        assert!(matches!(
            ThemeFinder::find(root.path()),
            Err(Error::ParentCycle(_))
        ));
    }

    #[test]
    fn test_excluded_and_hidden_directories_are_skipped() {
        let root = tempfile::tempdir().unwrap();
        write_theme(root.path(), "acme", "base", r#"{ "name": "acme/base" }"#);
        write_theme(root.path(), "node_modules", "pkg", r#"{ "name": "npm/pkg" }"#);
        write_theme(root.path(), ".hidden", "x", r#"{ "name": "hidden/x" }"#);

        let themes = ThemeFinder::find(root.path()).unwrap();
        assert_eq!(themes.len(), 1);
    }

    #[test]
    fn test_single_level_layout_is_accepted() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("standalone");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), r#"{ "name": "acme/standalone" }"#).unwrap();

        let themes = ThemeFinder::find(root.path()).unwrap();
        assert!(themes.contains_key("acme/standalone"));
    }

    #[test]
    fn test_find_key_vendor_qualified_and_bare() {
        let root = tempfile::tempdir().unwrap();
        write_theme(root.path(), "acme", "base", r#"{ "name": "acme/base" }"#);
        let themes = ThemeFinder::find(root.path()).unwrap();

        assert_eq!(find_key(&themes, "acme/base").as_deref(), Some("acme/base"));
        assert_eq!(find_key(&themes, "Base").as_deref(), Some("acme/base"));
        assert_eq!(find_key(&themes, "base-theme").as_deref(), Some("acme/base"));
        assert_eq!(find_key(&themes, "other/base"), None);
        assert_eq!(find_key(&themes, "missing"), None);
    }
}

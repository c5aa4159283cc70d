//! End-to-end tests for asset URL resolution across the theme parent chain.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use themely::{Config, ThemesManager};

fn write_theme(root: &Path, vendor: &str, name: &str, manifest: &str) {
    let dir = root.join(vendor).join(name);
    fs::create_dir_all(&dir).expect("failed to create theme dir");
    fs::write(dir.join("theme.json"), manifest).expect("failed to write manifest");
}

fn write_asset(theme_dir: &Path, relative: &str, contents: &str) {
    let path = theme_dir.join("public").join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Workspace with `acme/base` (logo.png, css/app.css) and `acme/dark`
/// (css/app.css only, extends base), with `acme/dark` enabled.
fn cascade_workspace() -> (TempDir, Config, ThemesManager) {
    let workspace = TempDir::new().expect("failed to create temp dir");
    let themes_root = workspace.path().join("themes");
    let public = workspace.path().join("public");
    fs::create_dir_all(&public).unwrap();

    write_theme(&themes_root, "acme", "base", r#"{ "name": "acme/base" }"#);
    write_theme(
        &themes_root,
        "acme",
        "dark",
        r#"{
            "name": "acme/dark",
            "extra": { "theme": { "parent": "acme/base", "brand": "acme" } }
        }"#,
    );
    write_asset(&themes_root.join("acme/base"), "logo.png", "png-bytes");
    write_asset(&themes_root.join("acme/base"), "css/app.css", "base css");
    write_asset(&themes_root.join("acme/dark"), "css/app.css", "dark css");

    let config = Config {
        directory: themes_root,
        public_dir: public,
        ..Config::default()
    };

    let mut manager = ThemesManager::new(config.clone()).expect("scan failed");
    manager.set("acme/dark").expect("activation failed");
    (workspace, config, manager)
}

#[test]
fn own_asset_wins_over_the_parent() {
    let (_workspace, _config, manager) = cascade_workspace();
    assert_eq!(manager.url("css/app.css", true), "/themes/acme/dark/css/app.css");
}

#[test]
fn missing_asset_falls_through_to_the_parent() {
    let (_workspace, _config, manager) = cascade_workspace();
    assert_eq!(manager.url("logo.png", true), "/themes/acme/base/logo.png");
}

#[test]
fn missing_everywhere_falls_back_to_the_public_dir() {
    let (_workspace, config, manager) = cascade_workspace();
    fs::write(config.public_dir.join("favicon.ico"), "ico").unwrap();

    assert_eq!(manager.url("favicon.ico", true), "/favicon.ico");
}

#[test]
fn unresolvable_asset_returns_the_normalized_path() {
    let (_workspace, _config, manager) = cascade_workspace();
    assert_eq!(manager.url("img\\missing.png", true), "img/missing.png");
}

#[test]
fn absolute_urls_pass_through_unmodified() {
    let (_workspace, _config, manager) = cascade_workspace();
    assert_eq!(
        manager.url("https://cdn.example.com/app.css", true),
        "https://cdn.example.com/app.css"
    );
}

#[test]
fn placeholders_substitute_before_lookup() {
    let (_workspace, config, manager) = cascade_workspace();
    // The dark theme declares extra { "brand": "acme" } and ships the file
    write_asset(
        &config.directory.join("acme/dark"),
        "acme/logo.png",
        "brand logo",
    );

    assert_eq!(
        manager.url("{brand}/logo.png", true),
        "/themes/acme/dark/acme/logo.png"
    );
}

#[test]
fn theme_qualified_references_resolve_against_that_theme() {
    let (_workspace, _config, manager) = cascade_workspace();
    assert_eq!(
        manager.url("acme/base::css/app.css", true),
        "/themes/acme/base/css/app.css"
    );
    // Unknown theme prefix degrades to a rooted path
    assert_eq!(manager.url("ghost::css/app.css", true), "/css/app.css");
}

#[test]
fn no_current_theme_roots_the_path() {
    let (_workspace, _config, mut manager) = cascade_workspace();
    manager.disable("acme/dark").unwrap();
    assert_eq!(manager.url("css/app.css", true), "/css/app.css");
}

#[test]
fn relative_urls_drop_the_leading_slash() {
    let (_workspace, _config, manager) = cascade_workspace();
    assert_eq!(manager.url("css/app.css", false), "themes/acme/dark/css/app.css");
}

#[test]
fn base_url_prefixes_absolute_urls() {
    let workspace = TempDir::new().unwrap();
    let themes_root = workspace.path().join("themes");
    let public = workspace.path().join("public");
    fs::create_dir_all(&public).unwrap();
    write_theme(&themes_root, "acme", "base", r#"{ "name": "acme/base" }"#);
    write_asset(&themes_root.join("acme/base"), "css/app.css", "css");

    let config = Config {
        directory: themes_root,
        public_dir: public,
        base_url: Some("https://example.com/".to_string()),
        ..Config::default()
    };
    let mut manager = ThemesManager::new(config).unwrap();
    manager.set("acme/base").unwrap();

    assert_eq!(
        manager.url("css/app.css", true),
        "https://example.com/themes/acme/base/css/app.css"
    );
}

#[test]
fn versioned_assets_carry_a_content_token() {
    let workspace = TempDir::new().unwrap();
    let themes_root = workspace.path().join("themes");
    let public = workspace.path().join("public");
    fs::create_dir_all(&public).unwrap();
    write_theme(&themes_root, "acme", "base", r#"{ "name": "acme/base" }"#);
    write_asset(&themes_root.join("acme/base"), "css/app.css", "css");

    let config = Config {
        directory: themes_root,
        public_dir: public,
        version_assets: true,
        ..Config::default()
    };
    let mut manager = ThemesManager::new(config).unwrap();
    manager.set("acme/base").unwrap();

    let url = manager.url("css/app.css", true);
    let (path, token) = url.split_once("?v=").expect("expected a version token");
    assert_eq!(path, "/themes/acme/base/css/app.css");
    assert_eq!(token.len(), 8);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn vite_manifest_maps_to_the_built_artifact() {
    let workspace = TempDir::new().unwrap();
    let themes_root = workspace.path().join("themes");
    let public = workspace.path().join("public");
    fs::create_dir_all(&public).unwrap();
    write_theme(&themes_root, "acme", "base", r#"{ "name": "acme/base" }"#);
    let base_dir = themes_root.join("acme/base");
    write_asset(&base_dir, "assets/app-4ed993c7.css", "built css");
    write_asset(
        &base_dir,
        "manifest.json",
        r#"{ "css/app.css": { "file": "assets/app-4ed993c7.css" } }"#,
    );

    let config = Config {
        directory: themes_root,
        public_dir: public,
        ..Config::default()
    };
    let mut manager = ThemesManager::new(config).unwrap();
    manager.set("acme/base").unwrap();

    assert_eq!(
        manager.url("css/app.css", true),
        "/themes/acme/base/assets/app-4ed993c7.css"
    );
}

#[test]
fn enabling_links_the_whole_parent_chain() {
    let (_workspace, config, _manager) = cascade_workspace();
    // Both the enabled child and its parent are reachable under the web root
    assert!(config.public_dir.join("themes/acme/dark/css/app.css").is_file());
    assert!(config.public_dir.join("themes/acme/base/logo.png").is_file());
}

#[test]
fn relative_symlinks_are_supported() {
    let workspace = TempDir::new().unwrap();
    let themes_root = workspace.path().join("themes");
    let public = workspace.path().join("public");
    fs::create_dir_all(&public).unwrap();
    write_theme(&themes_root, "acme", "base", r#"{ "name": "acme/base" }"#);
    write_asset(&themes_root.join("acme/base"), "logo.png", "png");

    let config = Config {
        directory: themes_root,
        public_dir: public.clone(),
        symlink_relative: true,
        ..Config::default()
    };
    let mut manager = ThemesManager::new(config).unwrap();
    manager.set("acme/base").unwrap();

    let link = public.join("themes/acme/base");
    assert!(link.join("logo.png").is_file());
    let target = fs::read_link(&link).unwrap();
    assert!(target.is_relative(), "expected a relative link, got {target:?}");
}

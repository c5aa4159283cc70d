//! Theme manifest files.
//!
//! Every theme directory carries a `theme.json` describing its identity:
//!
//! ```json
//! {
//!     "name": "acme/dark",
//!     "version": "1.2.0",
//!     "description": "Dark variant of the acme base theme",
//!     "extra": {
//!         "theme": {
//!             "parent": "acme/base",
//!             "screenshot": "screenshot.png",
//!             "brand": "acme"
//!         }
//!     }
//! }
//! ```
//!
//! `Manifest` is a deliberately explicit accessor over the raw JSON: dotted
//! keys in, values out, no reflection-style forwarding.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};

/// Name of the manifest file looked up inside each theme directory.
pub const MANIFEST_FILE: &str = "theme.json";

/// An in-memory view of one manifest file.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    attributes: Value,
}

impl Manifest {
    /// Read and parse a manifest file.
    ///
    /// Parse failures (including a non-object top level) surface as
    /// [`Error::InvalidManifest`] naming the offending file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let attributes: Value =
            serde_json::from_str(&contents).map_err(|err| Error::InvalidManifest {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;

        if !attributes.is_object() {
            return Err(Error::InvalidManifest {
                path: path.to_path_buf(),
                reason: "top level is not a JSON object".to_string(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            attributes,
        })
    }

    /// The file this manifest was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a value by dotted key, e.g. `"extra.theme.parent"`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut current = &self.attributes;
        for part in key.split('.') {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Look up a string value by dotted key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Look up a string value, falling back to `default` when absent.
    pub fn get_str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_str(key).unwrap_or(default)
    }

    /// Set a value at a dotted key, creating intermediate objects as needed.
    ///
    /// Existing non-object values along the path are replaced.
    pub fn set(&mut self, key: &str, value: Value) {
        let mut current = &mut self.attributes;
        let mut parts = key.split('.').peekable();

        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                if let Some(object) = current.as_object_mut() {
                    object.insert(part.to_string(), value);
                }
                return;
            }

            if !current
                .as_object()
                .and_then(|object| object.get(part))
                .is_some_and(Value::is_object)
            {
                if let Some(object) = current.as_object_mut() {
                    object.insert(part.to_string(), Value::Object(Default::default()));
                }
            }

            current = current
                .as_object_mut()
                .and_then(|object| object.get_mut(part))
                .expect("intermediate object inserted above");
        }
    }

    /// Write the manifest back to disk as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.attributes)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join(MANIFEST_FILE);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_dotted_get() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            r#"{
                "name": "acme/dark",
                "version": "1.2.0",
                "extra": { "theme": { "parent": "acme/base" } }
            }"#,
        );

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.get_str("name"), Some("acme/dark"));
        assert_eq!(manifest.get_str("extra.theme.parent"), Some("acme/base"));
        assert_eq!(manifest.get_str("extra.theme.screenshot"), None);
        assert_eq!(manifest.get_str_or("version", "0.1"), "1.2.0");
        assert_eq!(manifest.get_str_or("description", ""), "");
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), r#"{ "name": "acme/dark" }"#);

        let mut manifest = Manifest::load(&path).unwrap();
        manifest.set("extra.theme.parent", Value::String("acme/base".into()));
        assert_eq!(manifest.get_str("extra.theme.parent"), Some("acme/base"));

        manifest.save().unwrap();
        let reread = Manifest::load(&path).unwrap();
        assert_eq!(reread.get_str("extra.theme.parent"), Some("acme/base"));
    }

    #[test]
    fn test_invalid_json_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "{ nope");

        match Manifest::load(&path) {
            Err(Error::InvalidManifest { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected InvalidManifest, got {other:?}"),
        }
    }

    #[test]
    fn test_non_object_top_level_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "[1, 2, 3]");
        assert!(matches!(
            Manifest::load(&path),
            Err(Error::InvalidManifest { .. })
        ));
    }
}

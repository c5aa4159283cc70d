//! Theme scaffolding for `themely make`.
//!
//! Generates the conventional on-disk skeleton for a new theme:
//!
//! ```text
//! <root>/<vendor>/<name>/
//!     theme.json
//!     lang/
//!     public/
//!     resources/views/layouts/default.html
//! ```

use std::fs;
use std::path::PathBuf;

use serde_json::json;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::manifest::MANIFEST_FILE;
use crate::theme::normalize_name;

/// Description of the theme to generate.
#[derive(Debug, Clone, Default)]
pub struct ThemeSkeleton {
    pub vendor: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub parent: Option<String>,
}

impl ThemeSkeleton {
    /// Build from a `vendor/name` qualified name. A bare name gets an empty
    /// vendor; affixes are normalized away like everywhere else.
    pub fn from_qualified_name(qualified: &str) -> Self {
        let normalized = normalize_name(qualified).to_lowercase();
        let (vendor, name) = match normalized.split_once('/') {
            Some((vendor, name)) => (vendor.to_string(), name.to_string()),
            None => (String::new(), normalized),
        };

        Self {
            vendor,
            name,
            version: "0.1.0".to_string(),
            ..Self::default()
        }
    }

    fn qualified_name(&self) -> String {
        if self.vendor.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.vendor, self.name)
        }
    }
}

/// Create the theme directory skeleton under the configured themes root.
///
/// Refuses to overwrite an existing theme directory.
pub fn generate(config: &Config, skeleton: &ThemeSkeleton) -> Result<PathBuf> {
    let theme_dir = if skeleton.vendor.is_empty() {
        config.directory.join(&skeleton.name)
    } else {
        config.directory.join(&skeleton.vendor).join(&skeleton.name)
    };

    if theme_dir.exists() {
        return Err(Error::DuplicateTheme {
            name: skeleton.qualified_name(),
            first: theme_dir.clone(),
            second: theme_dir,
        });
    }

    let layouts_dir = theme_dir.join("resources").join("views").join("layouts");
    fs::create_dir_all(&layouts_dir)?;
    fs::create_dir_all(theme_dir.join("public"))?;
    fs::create_dir_all(theme_dir.join("lang"))?;

    fs::write(
        theme_dir.join(MANIFEST_FILE),
        serde_json::to_string_pretty(&manifest_json(skeleton))?,
    )?;
    fs::write(layouts_dir.join("default.html"), default_layout(skeleton))?;

    info!(theme = %skeleton.qualified_name(), path = %theme_dir.display(), "theme scaffolded");
    Ok(theme_dir)
}

fn manifest_json(skeleton: &ThemeSkeleton) -> serde_json::Value {
    let mut extra_theme = serde_json::Map::new();
    if let Some(parent) = &skeleton.parent {
        extra_theme.insert("parent".to_string(), json!(parent));
    }

    let mut manifest = json!({
        "name": skeleton.qualified_name(),
        "version": skeleton.version,
        "description": skeleton.description,
        "extra": { "theme": extra_theme },
    });

    if skeleton.author_name.is_some() || skeleton.author_email.is_some() {
        manifest["authors"] = json!([{
            "name": skeleton.author_name.clone().unwrap_or_default(),
            "email": skeleton.author_email.clone().unwrap_or_default(),
        }]);
    }

    manifest
}

fn default_layout(skeleton: &ThemeSkeleton) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         \x20   <meta charset=\"utf-8\">\n\
         \x20   <title>{}</title>\n\
         </head>\n\
         <body>\n\
         </body>\n\
         </html>\n",
        skeleton.qualified_name()
    )
}

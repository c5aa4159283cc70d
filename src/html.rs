//! HTML snippets for theme assets.
//!
//! The template-facing surface of the library: small string builders the host
//! application's view layer can call with resolved asset URLs.

/// `<link>` tag referencing a stylesheet.
pub fn style_tag(url: &str) -> String {
    format!(r#"<link media="all" type="text/css" rel="stylesheet" href="{url}">"#)
}

/// `<script>` tag referencing a script.
///
/// `mode` carries loading attributes (`"defer"`, `"async"` or empty);
/// `script_type` and `level` land in `type`/`data-level`.
pub fn script_tag(url: &str, mode: &str, script_type: &str, level: &str) -> String {
    if mode.is_empty() {
        format!(r#"<script src="{url}" type="{script_type}" data-level="{level}"></script>"#)
    } else {
        format!(
            r#"<script {mode} src="{url}" type="{script_type}" data-level="{level}"></script>"#
        )
    }
}

/// `<img>` tag with optional alt text, class and extra attributes.
pub fn image_tag(url: &str, alt: &str, class: &str, attributes: &[(&str, &str)]) -> String {
    let mut tag = format!(r#"<img src="{url}" alt="{alt}""#);
    if !class.is_empty() {
        tag.push_str(&format!(r#" class="{class}""#));
    }
    for (key, value) in attributes {
        tag.push_str(&format!(r#" {key}="{value}""#));
    }
    tag.push('>');
    tag
}

/// Page title, optionally combined with the application name.
///
/// `invert` puts the page title before the application name.
pub fn page_title(
    app_name: &str,
    title: &str,
    with_app_name: bool,
    separator: &str,
    invert: bool,
) -> String {
    if title.is_empty() || app_name.is_empty() {
        if title.is_empty() {
            return app_name.to_string();
        }
        return title.to_string();
    }

    if !with_app_name {
        return title.to_string();
    }

    let separator = separator.trim();
    if invert {
        format!("{title} {separator} {app_name}")
    } else {
        format!("{app_name} {separator} {title}")
    }
}

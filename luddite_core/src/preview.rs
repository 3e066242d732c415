//! Preview rendering boundary.
//!
//! The core never drives a rendering engine itself: it wraps the document body
//! in a fixed HTML skeleton and hands the result to a [`Renderer`].

use std::path::Path;

/// Shown when a document has no body at all.
pub const NOTHING_TO_SHOW: &str = "<h1>Nothing to show</h1>";

/// Displays wrapped preview HTML.
pub trait Renderer {
    /// Loads `html`, resolving relative resources (the stylesheet) against `base_dir`.
    fn render(&mut self, html: &str, base_dir: &Path);
}

/// Wraps a document body in the preview skeleton.
///
/// The body is inserted verbatim inside `<main>`, unescaped, so anchors reach
/// the renderer untouched.
pub fn wrap_html(content: Option<&str>) -> String {
    let body = content.unwrap_or(NOTHING_TO_SHOW);
    format!(
        "<!doctype html>
<html>
  <head>
    <link rel=\"stylesheet\" href=\"style.css\" type=\"text/css\"/>
  </head>
  <body>
    <main>
    {body}
    </main>
  </body>
</html>
"
    )
}

/// What a renderer should do with a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Hand the URL to the platform's browser and cancel the in-place load.
    OpenExternally,
    /// Follow the link inside the preview.
    Allow,
}

/// Classifies a navigation request: absolute http(s) URLs leave the preview.
pub fn navigation_policy(url: &str) -> Navigation {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Navigation::OpenExternally
    } else {
        Navigation::Allow
    }
}

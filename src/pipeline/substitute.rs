//! Placeholder substitution for typesetting sources.
//!
//! Values end up inside LaTeX macro arguments, so characters that are special
//! to TeX (`% # { } \ ~ $ ^ &` and line breaks) are refused rather than
//! escaped. A file path with `%` in it would silently truncate the line.
//! `_` is allowed; it is common in file names and `\includepdf` accepts it.

use crate::error::PdfPressError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches any `@@NAME@@` placeholder.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@@[A-Z_]+@@").expect("valid placeholder regex"));

const UNSAFE_CHARS: &[char] = &['%', '#', '{', '}', '\\', '~', '$', '^', '&', '\n', '\r'];

/// Fills a template with named values.
///
/// `values` pairs a bare placeholder name (`"PDF_PATH"`) with its text.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, values: &[(&str, String)]) -> Result<String, PdfPressError>;
}

/// Replaces `@@NAME@@` fences and rejects LaTeX-unsafe values.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEngine;

impl TemplateEngine for PlaceholderEngine {
    fn render(&self, template: &str, values: &[(&str, String)]) -> Result<String, PdfPressError> {
        let mut out = template.to_string();
        for (name, value) in values {
            if let Some(c) = value.chars().find(|c| UNSAFE_CHARS.contains(c)) {
                return Err(PdfPressError::Template(format!(
                    "value for {name} contains unsupported character {c:?}: '{value}'"
                )));
            }
            out = out.replace(&format!("@@{name}@@"), value);
        }

        let leftover: Vec<String> = placeholders(&out)
            .into_iter()
            .map(|name| format!("@@{name}@@"))
            .collect();
        if !leftover.is_empty() {
            return Err(PdfPressError::Template(format!(
                "unresolved placeholders: {}",
                leftover.join(", ")
            )));
        }
        Ok(out)
    }
}

/// Names of all placeholders in `template`, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for m in PLACEHOLDER.find_iter(template) {
        let name = m.as_str().trim_matches('@').to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

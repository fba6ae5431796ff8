//! Template rendering of the enriched match map.
//!
//! The report is produced by a jinja-style template evaluated over the full
//! file-entry map. Templates are data-only: the renderer exposes no code
//! execution beyond the template language itself.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::enrich::FileEntry;

/// Built-in report template: one line per file with its path, MIME type, and
/// modification time.
pub const DEFAULT_TEMPLATE: &str = "\
{% for filename, data in output|items %}{{ filename }}  {{ data.magic }}  {{ data.stat.modified }}
{% endfor %}";

/// Renders the enriched match map through the given template.
///
/// # Arguments
///
/// * `entries` - The full enriched map, exposed to the template as `output`
///   (path -> {matches, magic, stat, hashes})
/// * `template` - Template text override; `None` selects [`DEFAULT_TEMPLATE`]
///
/// # Errors
///
/// Returns an error if the template is malformed or rendering fails; report
/// errors are fatal, not recovered.
pub fn render_report(
    entries: &BTreeMap<PathBuf, FileEntry>,
    template: Option<&str>,
) -> Result<String> {
    // Template keys are display strings, not platform paths.
    let output: BTreeMap<String, &FileEntry> = entries
        .iter()
        .map(|(path, entry)| (path.display().to_string(), entry))
        .collect();

    let mut env = Environment::new();
    env.add_template("report", template.unwrap_or(DEFAULT_TEMPLATE))
        .context("Malformed report template")?;

    let rendered = env
        .get_template("report")
        .context("Malformed report template")?
        .render(context! { output })
        .context("Failed to render report template")?;

    Ok(rendered)
}

#[cfg(test)]
mod mod_tests;

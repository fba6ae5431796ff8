//! Environment-derived configuration and pattern resolution.
//!
//! This module builds the process configuration once at startup (lookup-library
//! directories and the report template override), merges the JSON lookup
//! library into a single table, and expands `{name}` placeholders in the
//! user-supplied search pattern.

use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Environment variable naming the lookup-library directories, `:`-separated.
pub const LIBS_ENV: &str = "EX_LIBS";

/// Environment variable overriding the built-in report template.
pub const TEMPLATE_ENV: &str = "EX_TEMPLATE";

/// Process configuration, read from the environment exactly once at startup
/// and passed down to the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directories scanned (non-recursively) for `*.json` lookup files.
    pub lib_dirs: Vec<PathBuf>,

    /// Report template override; `None` selects the built-in default.
    pub template: Option<String>,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// `EX_LIBS` is a `:`-separated directory list; when unset, the lookup
    /// library lives under `ex_libs` in the platform configuration directory
    /// (`~/.config/ex_libs` on Linux). `EX_TEMPLATE` overrides the report
    /// template verbatim.
    pub fn from_env() -> Self {
        let lib_dirs = match env::var(LIBS_ENV) {
            Ok(value) => value
                .split(':')
                .filter(|part| !part.is_empty())
                .map(PathBuf::from)
                .collect(),
            Err(_) => default_lib_dirs(),
        };

        Self {
            lib_dirs,
            template: env::var(TEMPLATE_ENV).ok(),
        }
    }
}

/// Default lookup-library location when `EX_LIBS` is unset.
fn default_lib_dirs() -> Vec<PathBuf> {
    dirs::config_dir()
        .map(|dir| vec![dir.join("ex_libs")])
        .unwrap_or_default()
}

/// Merges every JSON lookup file found directly inside the given directories
/// into a single name -> regex-fragment table.
///
/// Directories are visited in order and silently skipped when absent. Within a
/// directory, files load in lexicographic name order. Later files overwrite
/// earlier keys on collision (last-writer-wins), so the final directory in
/// `EX_LIBS` has the highest precedence.
///
/// # Errors
///
/// Returns an error if a lookup file cannot be read or is not a flat JSON
/// object of strings.
pub fn load_lookup_table(lib_dirs: &[PathBuf]) -> Result<BTreeMap<String, String>> {
    let mut table = BTreeMap::new();

    for dir in lib_dirs {
        if !dir.is_dir() {
            continue;
        }

        let mut lookup_files = Vec::new();
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read lookup directory {}", dir.display()))?;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to read lookup directory {}", dir.display()))?;
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                lookup_files.push(path);
            }
        }
        // Filesystem order is arbitrary; sort so precedence is reproducible.
        lookup_files.sort();

        for path in lookup_files {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read lookup file {}", path.display()))?;
            let entries: BTreeMap<String, String> = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid lookup file {}", path.display()))?;
            table.extend(entries);
        }
    }

    Ok(table)
}

/// Expands `{name}` placeholders in the pattern using the lookup table.
///
/// `{{` and `}}` escape literal braces. Expansion is total: every placeholder
/// must resolve, and the same pattern and table always yield the same string.
///
/// # Errors
///
/// Returns an error if a placeholder names a key absent from the table, or if
/// the pattern contains an unbalanced brace.
pub fn expand_pattern(pattern: &str, table: &BTreeMap<String, String>) -> Result<String> {
    let mut expanded = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    expanded.push('{');
                    continue;
                }

                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(inner) => name.push(inner),
                        None => bail!("Unbalanced '{{' in pattern '{pattern}'"),
                    }
                }

                match table.get(&name) {
                    Some(fragment) => expanded.push_str(fragment),
                    None => bail!("Unknown placeholder '{{{name}}}' in pattern '{pattern}'"),
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    expanded.push('}');
                    continue;
                }
                bail!("Unbalanced '}}' in pattern '{pattern}'");
            }
            other => expanded.push(other),
        }
    }

    Ok(expanded)
}

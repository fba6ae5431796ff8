//! File content searching functionality using regex patterns.
//!
//! This module drives the embedded regex-search backend over a single search
//! root, with glob filters layered on top, and collects one structured match
//! event per matched line per file.

use anyhow::{Context, Result, anyhow};
use globset::{Glob, GlobSet, GlobSetBuilder};
use grep::matcher::Matcher;
use grep::regex::{RegexMatcher, RegexMatcherBuilder};
use grep::searcher::sinks::UTF8;
use grep::searcher::{BinaryDetection, Searcher, SearcherBuilder};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::env;
use std::io;
use std::path::{Path, PathBuf};

use crate::paths::relative_to_root;
use crate::telemetry::{LogMessage, log_with_context};

/// Configuration options for file search operations.
///
/// The defaults mirror the tool's default search behavior: ignore files are
/// not honored, hidden files are included, smart case decides sensitivity,
/// and binary files are skipped. `--no-defaults` flips the first three back
/// to the backend's natural behavior.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Case-insensitive matching unless the pattern contains an uppercase
    /// character.
    pub smart_case: bool,

    /// Whether to honor ignore files (.gitignore and friends) when deciding
    /// which files to search.
    pub respect_gitignore: bool,

    /// Whether hidden files and directories are searched.
    pub include_hidden: bool,

    /// Whether to search inside files classified as binary.
    pub include_binary: bool,

    /// Glob filters applied to paths relative to the search root. Patterns
    /// prefixed with `!` exclude; all others include. With no include
    /// patterns, everything not excluded passes.
    pub globs: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            smart_case: true,
            respect_gitignore: false,
            include_hidden: true,
            include_binary: false,
            globs: Vec::new(),
        }
    }
}

impl SearchOptions {
    /// Options with all default behavior suppressed: ignore files honored,
    /// hidden files skipped, matching case-sensitive.
    pub fn no_defaults() -> Self {
        Self {
            smart_case: false,
            respect_gitignore: true,
            include_hidden: false,
            ..Self::default()
        }
    }
}

/// A single (start, end) byte range within a matched line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubMatch {
    pub start: usize,
    pub end: usize,
}

/// One matched line in one file, as reported by the search backend.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MatchEvent {
    /// Path to the file containing the match
    pub file_path: PathBuf,

    /// Line number where the match was found (1-based)
    pub line_number: u64,

    /// Byte ranges within the line matched by the pattern, in order
    pub submatches: Vec<SubMatch>,
}

/// Splits the user-supplied path list into the search root and glob filters.
///
/// The last supplied path is the literal search root; every preceding path is
/// applied as a glob filter on top of that root. With no paths at all, the
/// root is the current working directory and no filters apply.
///
/// # Errors
///
/// Returns an error if no paths were supplied and the current working
/// directory cannot be determined.
pub fn split_search_paths(mut paths: Vec<String>) -> Result<(PathBuf, Vec<String>)> {
    match paths.pop() {
        Some(root) => Ok((PathBuf::from(root), paths)),
        None => {
            let cwd = env::current_dir().context("Failed to determine current directory")?;
            Ok((cwd, Vec::new()))
        }
    }
}

/// Include/exclude glob filters over root-relative paths.
struct GlobFilter {
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl GlobFilter {
    /// Compiles the filter, or `None` when no patterns were given.
    fn build(patterns: &[String]) -> Result<Option<Self>> {
        if patterns.is_empty() {
            return Ok(None);
        }

        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        let mut has_includes = false;

        for pattern in patterns {
            if let Some(negated) = pattern.strip_prefix('!') {
                let glob = Glob::new(negated)
                    .with_context(|| format!("Invalid exclude glob '{pattern}'"))?;
                exclude.add(glob);
            } else {
                let glob =
                    Glob::new(pattern).with_context(|| format!("Invalid glob '{pattern}'"))?;
                include.add(glob);
                has_includes = true;
            }
        }

        Ok(Some(Self {
            include: if has_includes {
                Some(include.build().context("Failed to compile include globs")?)
            } else {
                None
            },
            exclude: exclude.build().context("Failed to compile exclude globs")?,
        }))
    }

    fn is_match(&self, path: &Path) -> bool {
        if self.exclude.is_match(path) {
            return false;
        }
        match &self.include {
            Some(include) => include.is_match(path),
            None => true,
        }
    }
}

/// Searches for the regex pattern in files under the given root.
///
/// # Arguments
///
/// * `pattern` - The resolved regular expression pattern to search for
/// * `root` - The directory (or single file) to search in
/// * `options` - Configuration options for the search operation
///
/// # Returns
///
/// A vector of match events, one per matched line, each carrying the file
/// path, the 1-based line number, and the submatch byte ranges within that
/// line, in the order the backend reported them.
///
/// # Errors
///
/// Returns an error if the regex pattern is invalid, the search root does not
/// exist, or the search operation itself fails. An individual file that
/// cannot be opened mid-walk is logged and skipped, matching the backend's
/// own behavior.
pub fn search_files(
    pattern: &str,
    root: &Path,
    options: &SearchOptions,
) -> Result<Vec<MatchEvent>> {
    if !root.exists() {
        return Err(anyhow!("Search root not found: {}", root.display()));
    }

    let matcher = build_matcher(pattern, options)?;

    let files = collect_files(root, options).context("Failed to collect files for searching")?;

    let binary_detection = if options.include_binary {
        BinaryDetection::none()
    } else {
        BinaryDetection::quit(b'\x00')
    };
    let mut searcher = SearcherBuilder::new()
        .binary_detection(binary_detection)
        .line_number(true)
        .build();

    let mut events = Vec::new();
    for file_path in files {
        search_one_file(&mut searcher, &matcher, &file_path, &mut events)?;
    }

    Ok(events)
}

/// Builds the regex matcher with the configured case behavior.
fn build_matcher(pattern: &str, options: &SearchOptions) -> Result<RegexMatcher> {
    RegexMatcherBuilder::new()
        .case_smart(options.smart_case)
        .build(pattern)
        .context("Failed to create regular expression matcher")
}

/// Runs the searcher over a single file, appending match events.
fn search_one_file(
    searcher: &mut Searcher,
    matcher: &RegexMatcher,
    file_path: &Path,
    events: &mut Vec<MatchEvent>,
) -> Result<()> {
    let result = searcher.search_path(
        matcher,
        file_path,
        UTF8(|line_number, line| {
            let mut submatches = Vec::new();
            matcher
                .find_iter(line.as_bytes(), |found| {
                    submatches.push(SubMatch {
                        start: found.start(),
                        end: found.end(),
                    });
                    true
                })
                .map_err(|e| io::Error::other(e.to_string()))?;

            events.push(MatchEvent {
                file_path: file_path.to_path_buf(),
                line_number,
                submatches,
            });
            Ok(true)
        }),
    );

    if let Err(e) = result {
        // Unreadable files are reported and skipped, like the backend does.
        if e.kind() == io::ErrorKind::NotFound || e.kind() == io::ErrorKind::PermissionDenied {
            log_with_context(
                log::Level::Warn,
                LogMessage {
                    message: format!("Failed to read file: {}", e),
                    module: "search",
                    context: Some(vec![("file_path", file_path.display().to_string())]),
                },
            );
            return Ok(());
        }
        return Err(anyhow!(
            "Error searching file {}: {}",
            file_path.display(),
            e
        ));
    }

    Ok(())
}

/// Collects the files under the root that the search should visit, applying
/// ignore-file, hidden-file, and glob filtering per the options.
fn collect_files(root: &Path, options: &SearchOptions) -> Result<Vec<PathBuf>> {
    let filter = GlobFilter::build(&options.globs)?;
    let mut files = Vec::new();

    let mut builder = WalkBuilder::new(root);
    builder.git_ignore(options.respect_gitignore);
    builder.hidden(!options.include_hidden);
    if !options.respect_gitignore {
        builder.ignore(false); // Turn off all ignore logic
        builder.git_exclude(false); // Don't use git exclude files
        builder.git_global(false); // Don't use global git ignore
    }

    for result in builder.build() {
        match result {
            Ok(entry) => {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                if let Some(filter) = &filter {
                    if !filter.is_match(&relative_to_root(path, root)) {
                        continue;
                    }
                }
                files.push(path.to_path_buf());
            }
            Err(err) => {
                log_with_context(
                    log::Level::Warn,
                    LogMessage {
                        message: format!("Error walking directory: {}", err),
                        module: "search",
                        context: Some(vec![("root", root.display().to_string())]),
                    },
                );
            }
        }
    }

    // The walker's order is unspecified; sort so runs are reproducible.
    files.sort();

    Ok(files)
}

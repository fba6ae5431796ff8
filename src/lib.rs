//! # exfind
//!
//! exfind is a personal file search utility.
//!
//! ## Pipeline
//!
//! * Pattern resolution - Expand `{name}` placeholders in the search pattern
//!   from a JSON lookup library
//! * File searching - Run the resolved regex over the search roots and collect
//!   per-line match events with submatch offsets
//! * Metadata enrichment - Describe every matched file once with its MIME type,
//!   stat fields, and content hashes
//! * Report rendering - Feed the enriched match map through a text template
//! * Run logging - Optionally ensure the run-log schema in a SQLite database

/// Environment-derived configuration and lookup-library pattern resolution
pub mod config;
/// Per-file metadata enrichment for the match set
pub mod enrich;
/// Path manipulation utilities
pub mod paths;
/// Template rendering of the enriched match map
pub mod report;
/// File content searching functionality using regex patterns
pub mod search;
/// Run-log schema management in an embedded SQLite database
pub mod store;
/// Logging initialization and structured log helpers
pub mod telemetry;

//! Per-file metadata enrichment for the match set.
//!
//! Every distinct file path appearing in the search output is described
//! exactly once: MIME type by content sniffing, a fixed set of filesystem
//! stat fields with decoded timestamps, and a fixed set of content hashes
//! over the full file bytes. Match records accumulate on the entry in the
//! order the backend reported them.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use crc32fast::Hasher as Crc32;
use infer::Infer;
use md5::Md5;
use serde::Serialize;
use sha1::{Digest, Sha1};
use sha2::{Sha224, Sha256, Sha384, Sha512};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};

use crate::search::{MatchEvent, SubMatch};

/// Hash algorithm names, in the order they appear in a file entry.
pub const HASH_ALGORITHMS: [&str; 7] = [
    "crc32", "md5", "sha1", "sha224", "sha256", "sha384", "sha512",
];

/// One matched line within a file entry.
#[derive(Serialize, Debug, Clone)]
pub struct MatchRecord {
    /// Line number of the match (1-based)
    pub line: u64,

    /// Submatch byte ranges within that line
    pub offsets: Vec<SubMatch>,
}

/// Fixed set of filesystem stat fields for a matched file.
///
/// Timestamp fields are decoded from the platform's epoch representation to
/// structured date-time values; everything else stays numeric.
#[derive(Serialize, Debug, Clone)]
pub struct FileStat {
    /// File size in bytes
    pub size: u64,

    /// Unix permission bits and file type
    #[cfg(unix)]
    pub mode: u32,

    /// Owning user id
    #[cfg(unix)]
    pub uid: u32,

    /// Owning group id
    #[cfg(unix)]
    pub gid: u32,

    /// Last modification time
    pub modified: DateTime<Utc>,

    /// Last access time
    pub accessed: DateTime<Utc>,

    /// Creation time, where the platform records one
    pub created: Option<DateTime<Utc>>,
}

impl FileStat {
    /// Reads the stat fields for a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be stat'ed, for example when it
    /// vanished between the search and the enrichment pass.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to stat file {}", path.display()))?;

        let modified = metadata
            .modified()
            .with_context(|| format!("No modification time for {}", path.display()))?;
        let accessed = metadata
            .accessed()
            .with_context(|| format!("No access time for {}", path.display()))?;
        let created = metadata.created().ok();

        #[cfg(unix)]
        use std::os::unix::fs::MetadataExt;

        Ok(Self {
            size: metadata.len(),
            #[cfg(unix)]
            mode: metadata.mode(),
            #[cfg(unix)]
            uid: metadata.uid(),
            #[cfg(unix)]
            gid: metadata.gid(),
            modified: DateTime::<Utc>::from(modified),
            accessed: DateTime::<Utc>::from(accessed),
            created: created.map(DateTime::<Utc>::from),
        })
    }
}

/// Everything known about a single matched file.
#[derive(Serialize, Debug, Clone)]
pub struct FileEntry {
    /// Matched lines in backend order
    pub matches: Vec<MatchRecord>,

    /// MIME type derived from content sniffing
    pub magic: String,

    /// Filesystem stat fields
    pub stat: FileStat,

    /// Hash-algorithm name -> hex digest over the full file content
    pub hashes: BTreeMap<String, String>,
}

impl FileEntry {
    /// Describes a file: reads its content once and derives the MIME type,
    /// stat fields, and all content hashes from that single read.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or stat'ed. There is no
    /// retry: a file that disappeared since the search is fatal to the run.
    pub fn describe(path: &Path) -> Result<Self> {
        let content = fs::read(path)
            .with_context(|| format!("Failed to read file {}", path.display()))?;

        Ok(Self {
            matches: Vec::new(),
            magic: sniff_mime_type(&content),
            stat: FileStat::from_path(path)?,
            hashes: compute_hashes(&content),
        })
    }
}

/// Builds the enriched file-entry map from the raw match stream.
///
/// Exactly one entry exists per distinct file path regardless of how many
/// lines matched; the entry is created the first time the path is seen and
/// subsequent events only append to its match list.
///
/// # Errors
///
/// Returns an error if any matched file cannot be read or stat'ed.
pub fn enrich_matches(events: &[MatchEvent]) -> Result<BTreeMap<PathBuf, FileEntry>> {
    let mut entries: BTreeMap<PathBuf, FileEntry> = BTreeMap::new();

    for event in events {
        let entry = match entries.entry(event.file_path.clone()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => vacant.insert(FileEntry::describe(&event.file_path)?),
        };

        entry.matches.push(MatchRecord {
            line: event.line_number,
            offsets: event.submatches.clone(),
        });
    }

    Ok(entries)
}

/// Derives a MIME type from file content alone, never from the extension.
///
/// Magic-byte inspection runs first; content it cannot classify falls back to
/// a printable-byte likelihood check over the leading bytes to separate plain
/// text from opaque binary data.
pub fn sniff_mime_type(content: &[u8]) -> String {
    if content.is_empty() {
        return "inode/x-empty".to_string();
    }

    let infer = Infer::new();
    if let Some(kind) = infer.get(content) {
        return kind.mime_type().to_string();
    }

    let sample = &content[..content.len().min(1024)];
    let printable = sample
        .iter()
        .filter(|b| (32..=126).contains(*b) || matches!(**b, b'\n' | b'\r' | b'\t'))
        .count();

    if printable as f64 / sample.len() as f64 > 0.8 {
        "text/plain".to_string()
    } else {
        "application/octet-stream".to_string()
    }
}

/// Computes every configured digest over the file content.
///
/// All algorithms consume the same in-memory buffer, so the file is read only
/// once no matter how many lines in it matched.
pub fn compute_hashes(content: &[u8]) -> BTreeMap<String, String> {
    let mut hashes = BTreeMap::new();

    let mut crc = Crc32::new();
    crc.update(content);
    hashes.insert("crc32".to_string(), format!("{:08x}", crc.finalize()));

    hashes.insert("md5".to_string(), hex::encode(Md5::digest(content)));
    hashes.insert("sha1".to_string(), hex::encode(Sha1::digest(content)));
    hashes.insert("sha224".to_string(), hex::encode(Sha224::digest(content)));
    hashes.insert("sha256".to_string(), hex::encode(Sha256::digest(content)));
    hashes.insert("sha384".to_string(), hex::encode(Sha384::digest(content)));
    hashes.insert("sha512".to_string(), hex::encode(Sha512::digest(content)));

    hashes
}

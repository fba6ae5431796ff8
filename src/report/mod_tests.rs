use super::*;
use crate::enrich::{FileStat, MatchRecord, compute_hashes};
use crate::search::SubMatch;
use anyhow::Result;
use chrono::{TimeZone, Utc};

fn sample_entries() -> BTreeMap<PathBuf, FileEntry> {
    let stat = FileStat {
        size: 6,
        #[cfg(unix)]
        mode: 0o100644,
        #[cfg(unix)]
        uid: 1000,
        #[cfg(unix)]
        gid: 1000,
        modified: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        accessed: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        created: None,
    };

    let entry = FileEntry {
        matches: vec![MatchRecord {
            line: 3,
            offsets: vec![SubMatch { start: 0, end: 3 }],
        }],
        magic: "text/plain".to_string(),
        stat,
        hashes: compute_hashes(b"hello\n"),
    };

    let mut entries = BTreeMap::new();
    entries.insert(PathBuf::from("/data/a.txt"), entry);
    entries
}

/// The default template lists path, MIME type, and modification time
#[test]
fn test_default_template_lists_path_magic_and_mtime() -> Result<()> {
    let rendered = render_report(&sample_entries(), None)?;

    assert!(rendered.contains("/data/a.txt"));
    assert!(rendered.contains("text/plain"));
    assert!(rendered.contains("2024-05-01"));

    Ok(())
}

/// A template override replaces the built-in report wholesale
#[test]
fn test_template_override() -> Result<()> {
    let rendered = render_report(&sample_entries(), Some("files={{ output|length }}"))?;

    assert_eq!(rendered, "files=1");

    Ok(())
}

/// Templates can reach into match records and digests
#[test]
fn test_template_sees_matches_and_hashes() -> Result<()> {
    let template =
        "{% for f, d in output|items %}{{ d.matches[0].line }}:{{ d.hashes.sha256 }}{% endfor %}";
    let rendered = render_report(&sample_entries(), Some(template))?;

    let expected_sha256 = compute_hashes(b"hello\n")["sha256"].clone();
    assert_eq!(rendered, format!("3:{}", expected_sha256));

    Ok(())
}

/// An empty match map still renders (to an empty report)
#[test]
fn test_empty_map_renders() -> Result<()> {
    let rendered = render_report(&BTreeMap::new(), None)?;

    assert!(rendered.trim().is_empty());

    Ok(())
}

/// A malformed template is a fatal template error
#[test]
fn test_malformed_template_fails() {
    assert!(render_report(&sample_entries(), Some("{% for broken")).is_err());
}

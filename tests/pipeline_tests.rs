use anyhow::Result;
use exfind::config::{expand_pattern, load_lookup_table};
use exfind::enrich::enrich_matches;
use exfind::report::render_report;
use exfind::search::{SearchOptions, SubMatch, search_files, split_search_paths};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

/// Tests for the whole search pipeline: resolve, search, enrich, render
#[cfg(test)]
mod pipeline_tests {
    use super::*;

    /// Scenario A: a literal pattern matched on line 3 flows through to a
    /// single enriched entry with one match record at offsets 0..3
    #[test]
    fn test_literal_pattern_end_to_end() -> Result<()> {
        let dir = TempDir::new()?;
        let file = dir.path().join("a.txt");
        fs::write(&file, "alpha\nbeta\nfoo bar\n")?;

        let lookup = BTreeMap::new();
        let compiled = expand_pattern("foo", &lookup)?;
        assert_eq!(compiled, "foo");

        let events = search_files(&compiled, dir.path(), &SearchOptions::default())?;
        let entries = enrich_matches(&events)?;

        assert_eq!(entries.len(), 1);
        let entry = entries.get(&file).expect("entry for a.txt");
        assert_eq!(entry.matches.len(), 1);
        assert_eq!(entry.matches[0].line, 3);
        assert_eq!(entry.matches[0].offsets, vec![SubMatch { start: 0, end: 3 }]);
        assert_eq!(entry.magic, "text/plain");

        let rendered = render_report(&entries, None)?;
        assert!(rendered.contains("a.txt"));
        assert!(rendered.contains("text/plain"));

        Ok(())
    }

    /// Scenario B: a placeholder pattern resolves through the lookup library
    /// and the resolved regex drives the search
    #[test]
    fn test_placeholder_pattern_end_to_end() -> Result<()> {
        let lib_dir = TempDir::new()?;
        fs::write(
            lib_dir.path().join("greetings.json"),
            r#"{"greeting": "hello"}"#,
        )?;

        let search_dir = TempDir::new()?;
        fs::write(search_dir.path().join("note.txt"), "hello world\n")?;

        let lookup = load_lookup_table(&[lib_dir.path().to_path_buf()])?;
        let compiled = expand_pattern("{greeting} world", &lookup)?;
        assert_eq!(compiled, "hello world");

        let events = search_files(&compiled, search_dir.path(), &SearchOptions::default())?;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].line_number, 1);

        Ok(())
    }

    /// Scenario C: an unresolvable placeholder fails before any search runs
    #[test]
    fn test_unresolvable_placeholder_aborts_before_search() {
        let lookup = BTreeMap::new();

        let err = expand_pattern("{missing}", &lookup).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    /// Scenario D: of two supplied paths, the last is the literal search root
    /// and the first narrows the walk as a glob filter
    #[test]
    fn test_path_asymmetry_root_and_glob() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("keep.rs"), "needle\n")?;
        fs::write(dir.path().join("skip.txt"), "needle\n")?;

        let supplied = vec![
            "*.rs".to_string(),
            dir.path().display().to_string(),
        ];
        let (root, globs) = split_search_paths(supplied)?;
        assert_eq!(root, dir.path());
        assert_eq!(globs, vec!["*.rs".to_string()]);

        let options = SearchOptions {
            globs,
            ..SearchOptions::default()
        };
        let events = search_files("needle", &root, &options)?;

        assert_eq!(events.len(), 1);
        assert!(events[0].file_path.ends_with("keep.rs"));

        Ok(())
    }

    /// A custom template renders over the same enriched map as the default
    #[test]
    fn test_custom_template_end_to_end() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("one.txt"), "needle\n")?;
        fs::write(dir.path().join("two.txt"), "needle\nneedle\n")?;

        let events = search_files("needle", dir.path(), &SearchOptions::default())?;
        let entries = enrich_matches(&events)?;
        assert_eq!(entries.len(), 2);

        let rendered = render_report(
            &entries,
            Some("{% for f, d in output|items %}{{ d.matches|length }};{% endfor %}"),
        )?;
        assert_eq!(rendered, "1;2;");

        Ok(())
    }

    /// Match-list lengths equal the matched-line counts the backend reported
    #[test]
    fn test_match_counts_survive_enrichment() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("multi.txt"), "needle\nhay\nneedle\nneedle\n")?;

        let events = search_files("needle", dir.path(), &SearchOptions::default())?;
        assert_eq!(events.len(), 3);

        let entries = enrich_matches(&events)?;
        let entry = entries
            .get(&dir.path().join("multi.txt"))
            .expect("entry for multi.txt");
        assert_eq!(entry.matches.len(), 3);
        let lines: Vec<u64> = entry.matches.iter().map(|m| m.line).collect();
        assert_eq!(lines, vec![1, 3, 4]);

        Ok(())
    }
}
